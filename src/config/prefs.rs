//! Small mutable preferences written back by the client, kept apart from
//! the hand-edited `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Prefs {
    path: PathBuf,
}

impl Prefs {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Prefs { path: path.into() }
    }

    /// ~/.one-good-hour/prefs.toml
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(super::prefs_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The persisted theme id, if any. An unreadable file counts as none.
    pub fn load_theme(&self) -> Option<String> {
        match self.read() {
            Ok(file) => file.theme,
            Err(e) => {
                tracing::warn!("ignoring unreadable prefs: {e:#}");
                None
            }
        }
    }

    pub fn save_theme(&self, id: &str) -> Result<()> {
        let mut file = self.read().unwrap_or_default();
        file.theme = Some(id.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string(&file).context("failed to serialize prefs")?;
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }

    fn read(&self) -> Result<PrefsFile> {
        if !self.path.exists() {
            return Ok(PrefsFile::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_has_no_theme() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Prefs::at(dir.path().join("prefs.toml"));
        assert_eq!(prefs.load_theme(), None);
    }

    #[test]
    fn saved_theme_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Prefs::at(dir.path().join("sub").join("prefs.toml"));
        prefs.save_theme("solarized").unwrap();
        assert_eq!(prefs.load_theme().as_deref(), Some("solarized"));

        prefs.save_theme("gruvbox").unwrap();
        assert_eq!(
            fs::read_to_string(prefs.path()).unwrap().trim(),
            "theme = \"gruvbox\""
        );
    }

    #[test]
    fn corrupt_file_is_ignored_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        fs::write(&path, "theme = [not toml").unwrap();
        let prefs = Prefs::at(&path);
        assert_eq!(prefs.load_theme(), None);
        prefs.save_theme("ember").unwrap();
        assert_eq!(prefs.load_theme().as_deref(), Some("ember"));
    }

    #[test]
    fn unwritable_location_reports_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();
        // A regular file where a directory is needed.
        let prefs = Prefs::at(blocker.join("prefs.toml"));
        assert!(prefs.save_theme("ember").is_err());
    }
}
