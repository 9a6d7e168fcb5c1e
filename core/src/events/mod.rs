pub mod hooks;
pub mod types;

pub use hooks::{NavigateHook, PreloadStats, PreloadTiming, StatsReporter};
pub use types::PreloadEvent;
