use std::{io::Write, path::PathBuf};

use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    report::{ExecutionResult, Reporter, RunSummary},
    rpc::StatementExecutor,
    script::{read_script, SqlScript},
};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub append_semicolon: bool,
}

/// Reads `path` and pushes every statement in it through `executor`.
///
/// A read failure aborts before any statement is sent. Statement failures
/// are reported and skipped over.
pub async fn push_file<E, W>(
    path: PathBuf,
    executor: &E,
    reporter: &mut Reporter<W>,
    opts: RunOptions,
) -> Result<RunSummary, RunError>
where
    E: StatementExecutor,
    W: Write,
{
    let run_id = Uuid::new_v4();
    let span = info_span!("push", run_id = %run_id, file = %path.display());
    async move {
        let script = read_script(&path).await.map_err(|e| {
            warn!(event = "script_read_failed", message = %e);
            e
        })?;
        Ok::<_, RunError>(push_script(&script, executor, reporter, opts).await)
    }
    .instrument(span)
    .await
}

pub async fn push_script<E, W>(
    script: &SqlScript,
    executor: &E,
    reporter: &mut Reporter<W>,
    opts: RunOptions,
) -> RunSummary
where
    E: StatementExecutor,
    W: Write,
{
    let statements = script.statements();
    reporter.script_loaded(script.char_len(), statements.len());
    info!(
        event = "script_loaded",
        path = %script.path().display(),
        statements = statements.len(),
    );

    for stmt in &statements {
        reporter.executing(stmt.ordinal);
        let payload = stmt.payload(opts.append_semicolon);
        let result = match executor.execute(&payload).await {
            Ok(_) => ExecutionResult::Success,
            Err(e) => {
                warn!(event = "statement_failed", ordinal = stmt.ordinal, message = %e);
                ExecutionResult::Failure(e.to_string())
            }
        };
        reporter.record(stmt.ordinal, &result);
    }

    let summary = reporter.finish();
    info!(
        event = "push_finished",
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed(),
    );
    summary
}
