use crate::models::EditorKind;

/// Where an editor's binary can be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executable {
    /// Looked up on `PATH`.
    Binary(&'static str),
    /// Started through `flatpak run <app id>`.
    Flatpak(&'static str),
}

impl Executable {
    pub fn program(&self) -> &'static str {
        match self {
            Executable::Binary(name) => name,
            Executable::Flatpak(_) => "flatpak",
        }
    }

    pub fn leading_args(&self) -> Vec<String> {
        match self {
            Executable::Binary(_) => Vec::new(),
            Executable::Flatpak(app_id) => vec!["run".to_string(), app_id.to_string()],
        }
    }
}

const VSCODE: &[Executable] = &[Executable::Binary("code"), Executable::Binary("code.exe")];
const NOTEPAD_PLUS_PLUS: &[Executable] = &[
    Executable::Binary("notepad++"),
    Executable::Binary("notepad++.exe"),
];
const NOTEPAD_NEXT: &[Executable] = &[
    Executable::Binary("notepadnext"),
    Executable::Binary("notepadnext.exe"),
    Executable::Binary("NotepadNext"),
    Executable::Binary("NotepadNext.exe"),
    Executable::Flatpak("io.github.flathub.notepadnext"),
    Executable::Flatpak("com.github.dail8859.NotepadNext"),
];
const NOTEPAD: &[Executable] = &[Executable::Binary("notepad"), Executable::Binary("notepad.exe")];

impl EditorKind {
    pub fn executables(&self) -> &'static [Executable] {
        match self {
            EditorKind::VsCode => VSCODE,
            EditorKind::NotepadPlusPlus => NOTEPAD_PLUS_PLUS,
            EditorKind::NotepadNext => NOTEPAD_NEXT,
            EditorKind::Notepad => NOTEPAD,
            EditorKind::SystemDefault | EditorKind::Custom => &[],
        }
    }

    pub fn supports_line_numbers(&self) -> bool {
        matches!(
            self,
            EditorKind::VsCode | EditorKind::NotepadPlusPlus | EditorKind::NotepadNext | EditorKind::Custom
        )
    }

    pub fn file_args(&self, path: &str) -> Vec<String> {
        vec![path.to_string()]
    }

    pub fn line_args(&self, path: &str, line: u64) -> Vec<String> {
        match self {
            EditorKind::VsCode => vec!["--goto".to_string(), format!("{path}:{line}")],
            EditorKind::NotepadPlusPlus => vec![format!("-n{line}"), path.to_string()],
            EditorKind::NotepadNext => {
                vec!["--line".to_string(), line.to_string(), path.to_string()]
            }
            EditorKind::Notepad | EditorKind::SystemDefault | EditorKind::Custom => {
                self.file_args(path)
            }
        }
    }

    /// Arguments for opening `path`, at `line` when the editor can jump there.
    pub fn args_for(&self, path: &str, line: Option<u64>) -> Vec<String> {
        match line {
            Some(line) if self.supports_line_numbers() => self.line_args(path, line),
            _ => self.file_args(path),
        }
    }
}

pub const DEFAULT_CUSTOM_TEMPLATE: &str = "{0}";

/// Expands a user template where `{0}` is the file and `{1}` the line.
///
/// The template is split on whitespace before substitution, so a path with
/// spaces stays a single argument. Quotes around a token are dropped.
pub fn expand_custom_template(template: &str, path: &str, line: u64) -> Vec<String> {
    let line = line.to_string();
    template
        .split_whitespace()
        .map(|token| token.trim_matches('"').trim_matches('\''))
        .filter(|token| !token.is_empty())
        .map(|token| token.replace("{0}", path).replace("{1}", &line))
        .collect()
}
