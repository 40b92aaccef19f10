use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use super::args::Invocation;
use super::parser::ResultCollector;
use super::paths::absolutize;
use crate::core::errors::{Error, Result};
use crate::models::{SearchOutcome, SearchRequest, SearchResult};

pub const DEFAULT_PROGRAM: &str = "rg";

/// Exit code ripgrep uses for "ran fine, nothing matched".
const EXIT_NO_MATCHES: i32 = 1;

/// Runs the external search tool. Holds no per-search state, so one runner
/// can serve any number of concurrent searches.
#[derive(Debug, Clone)]
pub struct SearchRunner {
    program: String,
    timeout: Option<Duration>,
}

impl Default for SearchRunner {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// Everything the tool wrote, plus how it exited.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub code: Option<i32>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl SearchRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Validates the request and resolves the command it would run.
    pub fn prepare(&self, request: &SearchRequest) -> Result<Invocation> {
        if request.pattern.is_empty() {
            return Err(Error::InvalidRequest("search pattern is required".to_string()));
        }
        let directory = request.directory.trim();
        if directory.is_empty() {
            return Err(Error::InvalidRequest("directory is required".to_string()));
        }
        if request.max_results == 0 {
            return Err(Error::InvalidRequest(
                "max results must be greater than zero".to_string(),
            ));
        }
        if request.max_matches_per_file == Some(0) {
            return Err(Error::InvalidRequest(
                "max matches per file must be greater than zero".to_string(),
            ));
        }

        let root = absolutize(Path::new(directory))?;
        if !root.is_dir() {
            return Err(Error::InvalidRequest(format!(
                "directory '{}' does not exist",
                root.display()
            )));
        }

        Ok(Invocation::new(self.program.clone(), request, root))
    }

    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let invocation = self.prepare(request)?;
        let command_line = invocation.command_line();
        tracing::info!(command = %command_line, "executing search");

        let started = Instant::now();
        let results = match self
            .run(&invocation)
            .await
            .and_then(|output| assemble(&invocation.root, request.max_results, output))
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!(command = %command_line, error = %e, "search failed");
                return Err(e);
            }
        };
        let duration = started.elapsed();

        tracing::info!(
            files = results.len(),
            elapsed_ms = duration.as_millis() as u64,
            "search finished"
        );

        Ok(SearchOutcome {
            results,
            command_line,
            duration_ms: duration.as_millis() as u64,
        })
    }

    /// Spawns the tool and drains both pipes while waiting for it to exit.
    pub async fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::SearchToolUnavailable {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("search tool stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("search tool stderr was not captured"))?;
        let stdout_task = tokio::spawn(collect_lines(stdout));
        let stderr_task = tokio::spawn(collect_lines(stderr));

        let drained = async {
            let (status, stdout, stderr) = tokio::join!(child.wait(), stdout_task, stderr_task);
            let status = status?;
            Ok::<_, Error>(ToolOutput {
                code: status.code(),
                stdout: stdout.map_err(io::Error::other)??,
                stderr: stderr.map_err(io::Error::other)??,
            })
        };

        let Some(limit) = self.timeout else {
            return drained.await;
        };
        let finished = tokio::time::timeout(limit, drained).await;
        match finished {
            Ok(output) => output,
            Err(_) => {
                tracing::warn!(timeout = ?limit, "search timed out, killing search tool");
                if let Err(e) = child.kill().await {
                    tracing::debug!("failed to kill search tool: {}", e);
                }
                Err(Error::Cancelled(limit))
            }
        }
    }

    /// True iff `<tool> --version` starts and exits cleanly.
    pub async fn is_tool_available(&self) -> bool {
        let status = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;
        match status {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!(program = %self.program, "search tool probe failed: {}", e);
                false
            }
        }
    }

    /// First line of `<tool> --version`.
    pub async fn tool_version(&self) -> Option<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .map(|line| line.trim().to_string())
    }
}

/// Applies exit code semantics and parses captured output.
pub fn assemble(root: &Path, max_files: usize, output: ToolOutput) -> Result<Vec<SearchResult>> {
    match output.code {
        Some(0) | Some(EXIT_NO_MATCHES) => {}
        code => {
            return Err(Error::SearchToolFailure {
                code,
                stderr: output.stderr.join("\n"),
            })
        }
    }

    let mut collector = ResultCollector::new(root);
    for line in &output.stdout {
        collector.push_line(line);
    }
    if collector.skipped() > 0 {
        tracing::warn!(skipped = collector.skipped(), "ignored unreadable output lines");
    }
    Ok(collector.finish(max_files))
}

async fn collect_lines<R>(reader: R) -> io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn output(code: i32, stdout: &[&str], stderr: &[&str]) -> ToolOutput {
        ToolOutput {
            code: Some(code),
            stdout: stdout.iter().map(|s| s.to_string()).collect(),
            stderr: stderr.iter().map(|s| s.to_string()).collect(),
        }
    }

    const A_TXT: &str = r#"{"type":"match","data":{"path":{"text":"a.txt"},"line_number":3,"lines":{"text":"foo bar\n"}}}"#;

    #[test]
    fn exit_zero_yields_parsed_results() -> Result<()> {
        let results = assemble(Path::new("/tmp/proj"), 1000, output(0, &[A_TXT], &[]))?;
        assert_eq!(results.len(), 1);
        assert!(results[0].file_path.ends_with("a.txt"));
        assert_eq!(results[0].matches[0].line_number, 3);
        assert_eq!(results[0].matches[0].content, "foo bar");
        assert!(!results[0].matches[0].is_context_only);
        Ok(())
    }

    #[test]
    fn exit_one_without_output_is_empty_success() -> Result<()> {
        let results = assemble(Path::new("/tmp/proj"), 1000, output(1, &[], &[]))?;
        assert!(results.is_empty());
        Ok(())
    }

    #[test]
    fn exit_two_is_failure_with_stderr() {
        let err = assemble(
            Path::new("/tmp/proj"),
            1000,
            output(2, &[A_TXT], &["regex parse error:", "    (foo"]),
        )
        .unwrap_err();
        match err {
            Error::SearchToolFailure { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "regex parse error:\n    (foo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn killed_by_signal_is_failure() {
        let err = assemble(Path::new("/tmp/proj"), 10, ToolOutput::default()).unwrap_err();
        assert!(matches!(err, Error::SearchToolFailure { code: None, .. }));
    }

    #[test]
    fn prepare_rejects_missing_fields() {
        let runner = SearchRunner::default();
        for request in [
            SearchRequest::new("", "/tmp"),
            SearchRequest::new("foo", ""),
            SearchRequest::new("foo", "   "),
        ] {
            assert!(matches!(
                runner.prepare(&request),
                Err(Error::InvalidRequest(_))
            ));
        }
    }

    #[test]
    fn prepare_rejects_zero_caps_and_missing_directory() {
        let dir = TempDir::new().unwrap();
        let runner = SearchRunner::default();
        let directory = dir.path().to_string_lossy().to_string();

        let request = SearchRequest {
            max_results: 0,
            ..SearchRequest::new("foo", directory.clone())
        };
        assert!(matches!(runner.prepare(&request), Err(Error::InvalidRequest(_))));

        let request = SearchRequest {
            max_matches_per_file: Some(0),
            ..SearchRequest::new("foo", directory.clone())
        };
        assert!(matches!(runner.prepare(&request), Err(Error::InvalidRequest(_))));

        let missing = dir.path().join("nope").to_string_lossy().to_string();
        let request = SearchRequest::new("foo", missing);
        assert!(matches!(runner.prepare(&request), Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn prepare_normalizes_root() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let spelled = format!("{}/./", dir.path().display());
        let invocation = SearchRunner::default().prepare(&SearchRequest::new("foo", spelled))?;
        assert_eq!(invocation.root, dir.path());
        assert_eq!(
            invocation.args.last().map(String::as_str),
            Some(&*dir.path().to_string_lossy())
        );
        assert!(invocation.command_line().starts_with("rg --json --ignore-case"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_tool_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let runner = SearchRunner::new("rgdesk-definitely-not-installed");
        let request = SearchRequest::new("foo", dir.path().to_string_lossy());
        let err = runner.execute(&request).await.unwrap_err();
        assert!(matches!(err, Error::SearchToolUnavailable { .. }));
        assert!(!runner.is_tool_available().await);
        assert_eq!(runner.tool_version().await, None);
    }
}
