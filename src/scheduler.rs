//! Periodic evaluation driver.

use std::time::Duration;

use crate::pipeline::Pipeline;

/// Evaluate once right away, then every `period`, until Ctrl-C.
///
/// The pipeline swallows its own failures, so a bad tick just means
/// waiting out the next interval.
pub async fn run(pipeline: &Pipeline, period: Duration) {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        pipeline.run().await;

        tokio::select! {
            _ = tokio::time::sleep(period) => {}
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::warn!("Could not listen for shutdown signal: {}", e);
                }
                tracing::info!("Shutting down");
                break;
            }
        }
    }
}
