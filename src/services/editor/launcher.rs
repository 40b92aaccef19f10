use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use super::templates::{expand_custom_template, Executable, DEFAULT_CUSTOM_TEMPLATE};
use crate::core::errors::{EditorError, Result};
use crate::models::{EditorKind, EditorSettings};
use crate::services::search::paths::absolutize;

/// One concrete way of starting an editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

/// Opens files in the editor chosen in [`EditorSettings`].
#[derive(Debug, Clone, Default)]
pub struct EditorLauncher {
    settings: EditorSettings,
}

impl EditorLauncher {
    pub fn new(settings: EditorSettings) -> Self {
        Self { settings }
    }

    /// Commands to try, in order, for opening `path` with `kind`.
    /// `SystemDefault` goes through the OS opener and has no commands.
    pub fn plan(
        &self,
        kind: EditorKind,
        path: &str,
        line: Option<u64>,
    ) -> std::result::Result<Vec<LaunchCommand>, EditorError> {
        match kind {
            EditorKind::SystemDefault => Ok(Vec::new()),
            EditorKind::Custom => {
                let program = self
                    .settings
                    .custom_editor_path
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .ok_or(EditorError::NotConfigured)?;
                let template = self
                    .settings
                    .custom_editor_args
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(DEFAULT_CUSTOM_TEMPLATE);
                Ok(vec![LaunchCommand {
                    program: program.to_string(),
                    args: expand_custom_template(template, path, line.unwrap_or(1)),
                }])
            }
            _ => Ok(kind
                .executables()
                .iter()
                .map(|exe| {
                    let mut args = exe.leading_args();
                    args.extend(kind.args_for(path, line));
                    LaunchCommand {
                        program: exe.program().to_string(),
                        args,
                    }
                })
                .collect()),
        }
    }

    /// Opens `file` in the preferred editor, jumping to `line` when the
    /// editor supports it. The editor is left running on its own.
    pub async fn launch(&self, file: &Path, line: Option<u64>) -> Result<()> {
        if !file.is_file() {
            tracing::warn!(path = %file.display(), "file does not exist");
            return Err(EditorError::FileNotFound(file.to_path_buf()).into());
        }
        let absolute = absolutize(file)?;
        let kind = self.settings.preferred_editor;

        if kind == EditorKind::SystemDefault {
            tracing::info!(path = %absolute.display(), "launching system default editor");
            return open::that_detached(&absolute).map_err(|source| {
                EditorError::SystemOpen {
                    path: absolute.clone(),
                    source,
                }
                .into()
            });
        }

        let path = absolute.to_string_lossy();
        for command in self.plan(kind, &path, line)? {
            match spawn_detached(&command) {
                Ok(()) => {
                    tracing::info!(
                        editor = %kind,
                        program = %command.program,
                        args = ?command.args,
                        "launched editor"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!(program = %command.program, "editor candidate failed: {}", e);
                }
            }
        }

        tracing::warn!(editor = %kind, "no working executable found");
        Err(EditorError::NoExecutable(kind).into())
    }

    /// Probes every known editor.
    pub async fn check_availability(&self) -> BTreeMap<EditorKind, bool> {
        let mut flatpak_apps: Option<String> = None;
        let mut availability = BTreeMap::new();

        for kind in EditorKind::ALL {
            let available = match kind {
                EditorKind::SystemDefault => true,
                EditorKind::Custom => match self.settings.custom_editor_path.as_deref() {
                    Some(path) => custom_available(path).await,
                    None => false,
                },
                _ => {
                    let mut found = false;
                    for exe in kind.executables() {
                        found = match exe {
                            Executable::Binary(name) => probe_binary(name).await,
                            Executable::Flatpak(app_id) => {
                                if flatpak_apps.is_none() {
                                    flatpak_apps = Some(list_flatpak_apps().await);
                                }
                                flatpak_apps
                                    .as_deref()
                                    .is_some_and(|apps| apps.contains(app_id))
                            }
                        };
                        if found {
                            break;
                        }
                    }
                    found
                }
            };
            availability.insert(kind, available);
        }

        availability
    }
}

/// A configured path must exist; a bare command name is looked up on
/// `PATH` by asking it for its version.
async fn custom_available(path: &str) -> bool {
    let path = path.trim();
    if path.is_empty() {
        return false;
    }
    let candidate = Path::new(path);
    if candidate.components().count() > 1 {
        candidate.exists()
    } else {
        probe_binary(path).await
    }
}

fn spawn_detached(command: &LaunchCommand) -> io::Result<()> {
    // Dropping the handle leaves the editor running; tokio reaps it.
    Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(drop)
}

async fn probe_binary(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .is_ok_and(|status| status.success())
}

async fn list_flatpak_apps() -> String {
    match Command::new("flatpak")
        .args(["list", "--app"])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
    {
        Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout).into_owned(),
        _ => String::new(),
    }
}
