use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Editors the launcher knows how to drive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum EditorKind {
    #[default]
    #[serde(rename = "vscode")]
    #[value(name = "vscode")]
    VsCode,
    NotepadPlusPlus,
    NotepadNext,
    Notepad,
    SystemDefault,
    Custom,
}

impl EditorKind {
    pub const ALL: [EditorKind; 6] = [
        EditorKind::VsCode,
        EditorKind::NotepadPlusPlus,
        EditorKind::NotepadNext,
        EditorKind::Notepad,
        EditorKind::SystemDefault,
        EditorKind::Custom,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            EditorKind::VsCode => "Visual Studio Code",
            EditorKind::NotepadPlusPlus => "Notepad++",
            EditorKind::NotepadNext => "Notepad Next",
            EditorKind::Notepad => "Notepad",
            EditorKind::SystemDefault => "System Default",
            EditorKind::Custom => "Custom",
        }
    }
}

impl fmt::Display for EditorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    pub preferred_editor: EditorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_editor_path: Option<String>,
    /// Argument template for the custom editor: `{0}` is the file, `{1}` the line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_editor_args: Option<String>,
}
