use std::path::{Path, PathBuf};

use crate::models::SearchRequest;

const CURRENT_DIR_MARKER: &str = ".";

/// A fully resolved search tool command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Absolute, normalized search root. Also the child's working directory.
    pub root: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, request: &SearchRequest, root: PathBuf) -> Self {
        let args = build_args(request, &root);
        Self {
            program: program.into(),
            args,
            root,
        }
    }

    pub fn command_line(&self) -> String {
        command_line(&self.program, &self.args)
    }
}

/// Translates a request into ripgrep flags. The pattern always precedes the
/// search root.
pub fn build_args(request: &SearchRequest, root: &Path) -> Vec<String> {
    let mut args = vec!["--json".to_string()];

    if !request.case_sensitive {
        args.push("--ignore-case".to_string());
    }
    if request.whole_word {
        args.push("--word-regexp".to_string());
    }
    if request.context_lines > 0 {
        args.push("--context".to_string());
        args.push(request.context_lines.to_string());
    }
    let per_file_cap = request.per_file_cap();
    if per_file_cap > 0 {
        args.push("--max-count".to_string());
        args.push(per_file_cap.to_string());
    }
    if request.include_hidden {
        args.push("--hidden".to_string());
    }
    for glob in request
        .file_type_globs
        .iter()
        .map(|glob| glob.trim())
        .filter(|glob| !glob.is_empty())
    {
        args.push("--glob".to_string());
        args.push(glob.to_string());
    }

    if request.pattern.starts_with('-') {
        args.push("--regexp".to_string());
    }
    args.push(request.pattern.clone());

    let directory = request.directory.trim();
    if !directory.is_empty() && directory != CURRENT_DIR_MARKER {
        args.push(root.to_string_lossy().into_owned());
    }

    args
}

/// Human-readable rendering of a command. Never passed to a shell.
pub fn command_line(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.chars().any(char::is_whitespace) {
            line.push('"');
            line.push_str(arg);
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}
