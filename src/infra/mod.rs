pub mod config;
pub mod file;
pub mod metrics;
pub mod subgraph;
