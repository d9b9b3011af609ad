pub mod config;
pub mod graph;
pub mod report;
pub mod summarize;
