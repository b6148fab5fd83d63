//! Skywatch watches the weather where you are and raises a desktop alert
//! when the next hour looks meaningfully different from right now.
//!
//! The interesting work lives in the member crates; this crate wires a
//! [`pipeline::Pipeline`] out of them and drives it on a schedule.

pub mod pipeline;
pub mod scheduler;

pub use pipeline::{Pipeline, TickError, TickOutcome};
