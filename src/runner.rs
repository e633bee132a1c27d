//! # Benchmark Runner
//!
//! Drives one engine at a time through a fixed lifecycle:
//!
//! ```text
//! Idle -> Opened -> Written -> Read -> Deleted -> Closed
//! ```
//!
//! Each phase covers the whole workload and is timed with a monotonic clock.
//! The report line `"<Engine> <Phase> benchmark: <duration>"` is written as
//! soon as the phase finishes, so results of completed phases stay visible
//! when a later phase fails.
//!
//! A phase error ends the engine's run immediately. Whether the remaining
//! engines still run is decided by `Config::keep_going` (off by default).
//! The engine's artifact directory is removed on every exit path.

use log::{debug, error, info, warn};
use rand::Rng;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::BenchError;
use crate::store::{BenchEngine, EngineKind};
use crate::workload::{self, KvPair};

/// One of the three timed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Write,
    Read,
    Delete,
}

impl Phase {
    /// Phases in the only order they may run.
    pub const ALL: [Phase; 3] = [Phase::Write, Phase::Read, Phase::Delete];
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Write => "Write",
            Phase::Read => "Read",
            Phase::Delete => "Delete",
        };
        f.write_str(s)
    }
}

/// Elapsed wall-clock time of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseResult {
    pub phase: Phase,
    pub elapsed: Duration,
}

/// Phase timings of one completed engine run.
#[derive(Debug, Clone)]
pub struct EngineReport {
    pub engine: EngineKind,
    pub phases: Vec<PhaseResult>,
}

/// Outcome of a full invocation.
///
/// `failures` is only ever non-empty when `keep_going` is set.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<EngineReport>,
    pub failures: Vec<BenchError>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Removes an engine's artifact directory when dropped.
struct ArtifactGuard {
    engine: &'static str,
    path: PathBuf,
}

impl ArtifactGuard {
    /// Claim `path` for this run, clearing leftovers of an interrupted earlier run.
    fn acquire(engine: &'static str, path: PathBuf) -> Self {
        if path.exists() {
            warn!("{}: removing stale artifacts at {}", engine, path.display());
            if let Err(source) = remove_artifacts(&path) {
                let err = BenchError::Cleanup {
                    engine,
                    path: path.clone(),
                    source,
                };
                warn!("{}", err);
            }
        }
        Self { engine, path }
    }
}

impl Drop for ArtifactGuard {
    fn drop(&mut self) {
        match remove_artifacts(&self.path) {
            Ok(()) => debug!("{}: removed {}", self.engine, self.path.display()),
            Err(source) => {
                let err = BenchError::Cleanup {
                    engine: self.engine,
                    path: self.path.clone(),
                    source,
                };
                warn!("{}", err);
            }
        }
    }
}

fn remove_artifacts(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Run the write, read and delete phases against an open engine, in order.
///
/// Stops at the first failing phase; the later phases are never started.
pub fn run_phases<W: Write>(
    engine: &mut dyn BenchEngine,
    pairs: &[KvPair],
    out: &mut W,
) -> Result<Vec<PhaseResult>, BenchError> {
    let name = engine.name();
    let mut results = Vec::with_capacity(Phase::ALL.len());

    for phase in Phase::ALL {
        debug!("{}: {} phase over {} pairs", name, phase, pairs.len());
        let start = Instant::now();
        let outcome = match phase {
            Phase::Write => engine.write_all(pairs),
            Phase::Read => engine.read_all(pairs),
            Phase::Delete => engine.delete_all(pairs),
        };
        let elapsed = start.elapsed();
        outcome.map_err(|source| BenchError::phase(name, phase, source))?;

        writeln!(out, "{} {} benchmark: {:?}", name, phase, elapsed)?;
        results.push(PhaseResult { phase, elapsed });
    }

    Ok(results)
}

/// Check that an opened engine commits synchronously, run its phases and
/// close it. A non-synchronous engine is refused before any phase runs.
pub fn bench_opened<W: Write>(
    engine: &mut dyn BenchEngine,
    dir: &Path,
    pairs: &[KvPair],
    out: &mut W,
) -> Result<Vec<PhaseResult>, BenchError> {
    let name = engine.name();
    let mode = engine.sync_mode().map_err(|source| BenchError::Open {
        engine: name,
        path: dir.to_path_buf(),
        source,
    })?;
    if !mode.is_synchronous() {
        return Err(BenchError::NotDurable { engine: name, mode });
    }
    info!("{} opened at {} with {} durability", name, dir.display(), mode);

    let phases = run_phases(engine, pairs, out)?;

    engine
        .close()
        .map_err(|source| BenchError::Close { engine: name, source })?;
    Ok(phases)
}

/// Benchmark a single engine on a freshly generated workload.
pub fn run_engine<R, W>(
    kind: EngineKind,
    config: &Config,
    rng: &mut R,
    out: &mut W,
) -> Result<EngineReport, BenchError>
where
    R: Rng + ?Sized,
    W: Write,
{
    let name = kind.label();
    info!("Running {} benchmark...", name);

    let pairs = workload::generate(rng, config.nops, config.lkv);
    let dir = kind.artifact_dir(&config.data_dir);

    // Declared before the engine so the engine is dropped (closed) first.
    let _artifacts = ArtifactGuard::acquire(name, dir.clone());

    let mut engine = kind
        .open(&dir, config)
        .map_err(|source| BenchError::Open {
            engine: name,
            path: dir.clone(),
            source,
        })?;

    let phases = bench_opened(engine.as_mut(), &dir, &pairs, out)?;
    drop(engine);
    info!("{} closed", name);

    Ok(EngineReport {
        engine: kind,
        phases,
    })
}

/// Benchmark every configured engine in order, separated by blank lines.
///
/// Without `keep_going` the first error is returned and no further engine
/// runs. With it, errors are logged and collected in the summary.
pub fn run_all<R, W>(config: &Config, rng: &mut R, out: &mut W) -> Result<RunSummary, BenchError>
where
    R: Rng + ?Sized,
    W: Write,
{
    let mut summary = RunSummary::default();

    for (i, &kind) in config.engines.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        match run_engine(kind, config, rng, out) {
            Ok(report) => summary.reports.push(report),
            Err(e) if config.keep_going => {
                error!("{}", e);
                summary.failures.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}
