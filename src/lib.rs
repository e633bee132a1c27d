//! # kvbench
//!
//! Comparative micro-benchmark for embedded key-value storage engines. Every
//! engine gets a workload of the same shape (random keys and values, same
//! count and length), is opened with synchronous durability, and is timed
//! through a write, a point-read and a delete phase.

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod store;
pub mod workload;

pub use config::Config;
pub use error::{BenchError, StoreError};
pub use runner::{
    bench_opened, run_all, run_engine, run_phases, EngineReport, Phase, PhaseResult, RunSummary,
};
pub use store::{BenchEngine, EngineKind, SyncMode};
pub use workload::{KvPair, Workload};
