//! Batch compilation of many documents across a rayon pool.

use crate::compiler::DocCompiler;
use crate::types::CompileResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single document to compile.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    /// Document identifier, echoed back in its result.
    pub id: String,
    /// Raw markdown source.
    pub source: String,
    /// Path of the document on disk. Defaults to `id`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

/// Options for [`DocCompiler::compile_batch`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchOptions {
    /// Upper bound on worker threads. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Keep compiling after a failure. Defaults to true.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
        }
    }
}

/// Outcome for one document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Identifier from the matching [`BatchInput`].
    pub id: String,
    /// Compiled output on success.
    pub result: Option<CompileResult>,
    /// Error message on failure.
    pub error: Option<String>,
}

/// Counters for a finished batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Number of documents submitted.
    pub total: u32,
    /// Number compiled successfully.
    pub succeeded: u32,
    /// Number that failed.
    pub failed: u32,
    /// Wall-clock time for the whole batch.
    pub processing_time_ms: f64,
}

/// Results and statistics for a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Per-document results, in input order.
    pub results: Vec<BatchResult>,
    /// Aggregate counters.
    pub stats: BatchStats,
}

impl DocCompiler {
    /// Compiles `inputs` in parallel against a shared cache.
    ///
    /// With `continue_on_error` unset the documents are compiled one by one
    /// and the batch stops after the first failure, so `results` may be
    /// shorter than `inputs`.
    pub fn compile_batch(
        &self,
        inputs: Vec<BatchInput>,
        project_root: impl AsRef<Path>,
        options: BatchOptions,
    ) -> BatchReport {
        let start = Instant::now();
        let project_root = project_root.as_ref();

        let pool = options.max_threads.and_then(|threads| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| log::warn!("Falling back to the global pool: {err}"))
                .ok()
        });

        let total = u32::try_from(inputs.len()).unwrap_or(u32::MAX);
        let succeeded = AtomicU32::new(0);
        let failed = AtomicU32::new(0);

        let process_input = |input: BatchInput| -> BatchResult {
            let file_path = input
                .file_path
                .unwrap_or_else(|| PathBuf::from(&input.id));
            match self.compile(&input.source, &file_path, project_root) {
                Ok(result) => {
                    succeeded.fetch_add(1, Ordering::Relaxed);
                    BatchResult {
                        id: input.id,
                        result: Some(result),
                        error: None,
                    }
                }
                Err(err) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    log::error!("Failed to compile {}: {err}", input.id);
                    BatchResult {
                        id: input.id,
                        result: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        };

        let results: Vec<BatchResult> = if options.continue_on_error {
            match pool {
                Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
                None => inputs.into_par_iter().map(process_input).collect(),
            }
        } else {
            let mut results = Vec::with_capacity(inputs.len());
            for input in inputs {
                let result = process_input(input);
                let stop = result.error.is_some();
                results.push(result);
                if stop {
                    break;
                }
            }
            results
        };

        let stats = BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        log::debug!(
            "Batch finished: {}/{} succeeded in {:.1}ms",
            stats.succeeded,
            stats.total,
            stats.processing_time_ms
        );
        BatchReport { results, stats }
    }
}
