pub mod prefs;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tui::theme::ThemeConfig;

pub use prefs::Prefs;

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Poll period in milliseconds. Default: 250
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Per-request timeout in milliseconds. Default: 2000
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Consecutive failed round-trips before the title bar shows
    /// "disconnected". Default: 3
    #[serde(default = "default_disconnect_after")]
    pub disconnect_after: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            tick_ms: default_tick_ms(),
            timeout_ms: default_timeout_ms(),
            disconnect_after: default_disconnect_after(),
        }
    }
}

impl SyncConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct BackendConfig {
    /// Connect to a `serve` daemon on this socket instead of running the
    /// engine in-process.
    #[serde(default)]
    pub socket: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoundConfig {
    /// Whether the chime plays at all. Default: true
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Program (and arguments) to run for the chime, e.g. `"paplay bell.oga"`.
    /// Default: none, ring the terminal bell
    #[serde(default)]
    pub command: Option<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig {
            enabled: true,
            command: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tick_ms() -> u64 {
    250
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_disconnect_after() -> u32 {
    3
}

impl SoundConfig {
    /// Play one chime. Never blocks on the player and never fails the caller.
    pub fn play(&self) {
        if !self.enabled {
            return;
        }

        let Some(command) = self.command.as_deref() else {
            let mut out = std::io::stdout();
            if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
                tracing::warn!("terminal bell failed: {}", e);
            }
            return;
        };

        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            tracing::warn!("sound command is empty");
            return;
        };

        let mut cmd = Command::new(program);
        cmd.args(parts);

        // Fire and forget
        if let Err(e) = cmd.spawn() {
            tracing::warn!("sound command failed: {}", e);
        }
    }
}

/// Returns the base config directory: ~/.one-good-hour/
pub fn base_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    Ok(home.join(".one-good-hour"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("config.toml"))
}

/// Returns the path to the persisted preferences (active theme)
pub fn prefs_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("prefs.toml"))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(base_dir()?.join("logs"))
}

/// Returns the default socket for `serve`
pub fn socket_path() -> Result<PathBuf> {
    Ok(base_dir()?.join("backend.sock"))
}

/// Ensure all required directories exist
pub fn ensure_dirs() -> Result<()> {
    fs::create_dir_all(base_dir()?).context("failed to create ~/.one-good-hour/")?;
    fs::create_dir_all(log_dir()?).context("failed to create ~/.one-good-hour/logs/")?;
    Ok(())
}

/// Load config from ~/.one-good-hour/config.toml (or return defaults if it doesn't exist)
pub fn load() -> Result<Config> {
    load_from(&config_path()?)
}

pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

/// Template written by `one-good-hour init`.
pub const DEFAULT_CONFIG: &str = r##"# One Good Hour configuration

[sync]
# How often the backend is polled, in milliseconds.
tick_ms = 250
# Give up on a single request after this many milliseconds.
timeout_ms = 2000
# Show "disconnected" after this many failed requests in a row.
disconnect_after = 3

[backend]
# Talk to `one-good-hour serve` instead of running in-process.
# socket = "/home/me/.one-good-hour/backend.sock"

[sound]
enabled = true
# command = "paplay /usr/share/sounds/freedesktop/stereo/complete.oga"

[theme]
# ember, catppuccin, solarized or gruvbox
default = "ember"
# Per-role overrides apply on top of every preset:
# bright = "#ff0000"
# dim = "rgb(120, 70, 0)"
"##;

/// Write `DEFAULT_CONFIG` to `path` unless a config already exists.
/// Returns whether a file was written.
pub fn write_default(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use super::*;
    use crate::tui::theme::PRESETS;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg.sync.tick(), Duration::from_millis(250));
        assert_eq!(cfg.sync.timeout(), Duration::from_secs(2));
        assert_eq!(cfg.sync.disconnect_after, 3);
        assert!(cfg.sound.enabled);
        assert!(cfg.sound.command.is_none());
        assert!(cfg.backend.socket.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let body = r##"[sync]
tick_ms = 100

[backend]
socket = "/tmp/ogh.sock"

[theme]
default = "gruvbox"
bright = "#ff0000"
"##;
        fs::write(&path, body).unwrap();

        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.sync.tick_ms, 100);
        assert_eq!(cfg.sync.timeout_ms, 2000);
        assert_eq!(cfg.backend.socket, Some(PathBuf::from("/tmp/ogh.sock")));
        assert_eq!(cfg.theme.default.as_deref(), Some("gruvbox"));
        let palette = cfg.theme.build(&PRESETS[0]);
        assert_eq!(palette.bright, Color::Rgb(255, 0, 0));
        assert_eq!(palette.bg, PRESETS[0].palette.bg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sync\ntick_ms = ").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn default_template_parses_to_defaults() {
        let cfg: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(cfg.sync.tick_ms, default_tick_ms());
        assert_eq!(cfg.theme.default.as_deref(), Some("ember"));
    }

    #[test]
    fn write_default_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        assert!(write_default(&path).unwrap());
        fs::write(&path, "[sync]\ntick_ms = 500\n").unwrap();
        assert!(!write_default(&path).unwrap());
        assert_eq!(load_from(&path).unwrap().sync.tick_ms, 500);
    }

    #[test]
    fn zero_durations_are_clamped() {
        let cfg = SyncConfig {
            tick_ms: 0,
            timeout_ms: 0,
            disconnect_after: 0,
        };
        assert_eq!(cfg.tick(), Duration::from_millis(1));
        assert_eq!(cfg.timeout(), Duration::from_millis(1));
    }

    #[test]
    fn disabled_sound_is_silent() {
        let sound = SoundConfig {
            enabled: false,
            command: Some("definitely-not-a-real-player".into()),
        };
        sound.play();
    }
}
