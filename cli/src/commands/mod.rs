pub mod cli;
pub mod plan;
pub mod simulate;
