//! Preload chain builder and cancellable execution engine.
//!
//! # Architecture
//!
//! ```text
//! Vec<Descriptor>
//!   ↓
//! Chain::build()        → blocking descriptors become Single stages,
//!   ↓                     runs of non-blocking ones are merged into a Batch
//! Chain { stages }
//!   ↓
//! ExecutionEngine::execute() → stages strictly in order, batches concurrently,
//!                              fail fast, stop on session cancellation
//!   ↓
//! ChainResult
//! ```

mod chain;
mod engine;
mod scheduler;
pub mod types;

pub use chain::{Chain, Stage};
pub use engine::ExecutionEngine;
pub use scheduler::{run_stage, StageSettlement};
pub use types::{
    BatchFailurePolicy, Cancellable, ChainResult, LoadFn, LoadOptions, LoadReturn, LoadTask,
    TaskFuture, TaskHandle,
};
