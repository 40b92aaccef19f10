use std::path::{Path, PathBuf};

use super::{read_json, write_json};
use crate::core::errors::Result;
use crate::models::EditorSettings;

/// The user's editor preference, backed by one JSON file.
#[derive(Debug)]
pub struct EditorSettingsStore {
    path: PathBuf,
    settings: EditorSettings,
}

impl EditorSettingsStore {
    /// Loads from `path`, falling back to defaults when the file is absent
    /// or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read_json::<EditorSettings>(&path) {
            Ok(Some(settings)) => {
                tracing::info!(path = %path.display(), "editor settings loaded");
                settings
            }
            Ok(None) => EditorSettings::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load editor settings, using defaults");
                EditorSettings::default()
            }
        };
        Self { path, settings }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub async fn save(&mut self, settings: EditorSettings) -> Result<()> {
        write_json(&self.path, &settings).await?;
        self.settings = settings;
        tracing::info!(path = %self.path.display(), "editor settings saved");
        Ok(())
    }
}
