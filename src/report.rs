use std::{
    io::{self, Write},
    process::ExitCode,
};

pub const VERIFY_QUERY: &str =
    "SELECT table_name FROM information_schema.tables WHERE table_schema = 'public';";

pub const MANUAL_FALLBACK_HINT: &str =
    "You may need to run the SQL manually in the dashboard SQL Editor.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    Failure(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }

    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }

    /// 0 when at least one statement went through, 1 otherwise (0/0 included).
    pub fn exit_status(&self) -> u8 {
        if self.any_succeeded() {
            0
        } else {
            1
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Human-facing progress output. Write errors are ignored: losing a progress
/// line must not change what gets executed.
pub struct Reporter<W: Write> {
    out: W,
    total: usize,
    summary: RunSummary,
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            total: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn target(&mut self, url: &str) {
        let _ = writeln!(self.out, "Target: {}", url);
    }

    pub fn connection_failed(&mut self, message: &str) {
        let _ = writeln!(self.out, "Cannot connect to service: {}", message);
    }

    pub fn script_loaded(&mut self, chars: usize, statements: usize) {
        self.total = statements;
        let _ = writeln!(self.out, "Read SQL file: {} characters", chars);
        let _ = writeln!(self.out, "Found {} SQL statements", statements);
    }

    pub fn executing(&mut self, ordinal: usize) {
        let _ = writeln!(
            self.out,
            "Executing statement {}/{}...",
            ordinal, self.total
        );
    }

    pub fn record(&mut self, ordinal: usize, result: &ExecutionResult) {
        self.summary.attempted += 1;
        match result {
            ExecutionResult::Success => {
                self.summary.succeeded += 1;
                let _ = writeln!(self.out, "Statement {} executed successfully", ordinal);
            }
            ExecutionResult::Failure(message) => {
                let _ = writeln!(self.out, "Statement {} failed: {}", ordinal, message);
            }
        }
    }

    pub fn finish(&mut self) -> RunSummary {
        let s = self.summary;
        let _ = writeln!(self.out);
        let _ = writeln!(
            self.out,
            "Results: {}/{} statements executed successfully",
            s.succeeded, s.attempted
        );
        let _ = writeln!(self.out, "Failed: {}/{}", s.failed(), s.attempted);

        if s.any_succeeded() {
            let _ = writeln!(self.out, "Database push completed");
            let _ = writeln!(self.out);
            let _ = writeln!(self.out, "Next steps:");
            let _ = writeln!(self.out, "1. Open the project dashboard");
            let _ = writeln!(self.out, "2. Check the Table Editor to see your tables");
            let _ = writeln!(self.out, "3. Run this query to verify:");
            let _ = writeln!(self.out, "   {}", VERIFY_QUERY);
            if s.failed() > 0 {
                let _ = writeln!(
                    self.out,
                    "Some statements failed. Check the output above for details."
                );
                let _ = writeln!(self.out, "{}", MANUAL_FALLBACK_HINT);
            }
        } else {
            let _ = writeln!(self.out, "No statements executed successfully");
            let _ = writeln!(self.out, "{}", MANUAL_FALLBACK_HINT);
        }
        let _ = self.out.flush();
        s
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
