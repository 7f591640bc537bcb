//! Presentation settings: theme and font, shared by every open document.
//!
//! Settings are process-wide, loaded once at startup, and written back after
//! every successful change. The on-disk format is a small TOML record at a
//! platform config path (`dirs::config_dir()/quill/quill.toml`), with a
//! local-directory `quill.toml` taking precedence when present. A missing or
//! unparseable file falls back to defaults without failing the application.
//!
//! Document surfaces never read these fields directly; they receive a resolved
//! [`DocStyle`] through the presentation fan-out so restyling always reaches
//! every open document, not only the active one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: u32 = 12;

/// Color scheme applied uniformly across all documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Surface colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                background: "#ffffff",
                foreground: "#000000",
            },
            Theme::Dark => Palette {
                background: "#1e1e1e",
                foreground: "#d4d4d4",
            },
        }
    }
}

/// Background/foreground pair derived from a [`Theme`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
}

/// Resolved presentation for one document surface: palette plus font. Handed
/// to documents by the fan-out; documents never consult global settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocStyle {
    pub background: &'static str,
    pub foreground: &'static str,
    pub font_family: String,
    pub font_size: u32,
}

/// Validation failures for user-supplied settings values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("font size must be a positive integer, got {0:?}")]
    InvalidFontSize(String),
    #[error("font family must not be empty")]
    EmptyFontFamily,
}

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Best-effort settings path following platform conventions. A local
/// `quill.toml` (useful for portable installs and tests) wins over the
/// per-user config directory.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("quill.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("quill").join("quill.toml");
    }
    PathBuf::from("quill.toml")
}

/// Load settings from `path` (or the discovered location). Missing file and
/// parse failures both degrade to defaults; the editor must start regardless
/// of settings state.
pub fn load_from(path: Option<PathBuf>) -> Settings {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Settings>(&content) {
            Ok(settings) => {
                info!(
                    target: "config",
                    path = %path.display(),
                    theme = settings.theme.name(),
                    font_family = settings.font_family.as_str(),
                    font_size = settings.font_size,
                    "settings_loaded"
                );
                settings.sanitized()
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "settings_parse_failed_using_defaults");
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

impl Settings {
    /// Validate and apply a font size. Zero is rejected; the stored value is
    /// untouched on error.
    pub fn set_font_size(&mut self, size: u32) -> Result<(), SettingsError> {
        if size == 0 {
            return Err(SettingsError::InvalidFontSize("0".to_string()));
        }
        self.font_size = size;
        Ok(())
    }

    /// Validate and apply a font family. Whitespace-only input is rejected.
    pub fn set_font_family(&mut self, family: &str) -> Result<(), SettingsError> {
        let family = family.trim();
        if family.is_empty() {
            return Err(SettingsError::EmptyFontFamily);
        }
        self.font_family = family.to_string();
        Ok(())
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggle();
        self.theme
    }

    /// Parse raw user input into a font size, producing the validation error
    /// the dispatcher surfaces on bad input (non-numeric or non-positive).
    pub fn parse_font_size(raw: &str) -> Result<u32, SettingsError> {
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(SettingsError::InvalidFontSize(raw.trim().to_string())),
        }
    }

    /// Resolve the style every document surface should display right now.
    pub fn style(&self) -> DocStyle {
        let palette = self.theme.palette();
        DocStyle {
            background: palette.background,
            foreground: palette.foreground,
            font_family: self.font_family.clone(),
            font_size: self.font_size,
        }
    }

    /// Serialize to TOML and write to `path`, creating parent directories.
    /// Callers log failures and carry on; a broken settings write never
    /// disturbs editor state.
    pub fn persist_to(&self, path: &std::path::Path) -> Result<()> {
        let serialized = toml::to_string_pretty(self).context("serialize settings")?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create settings dir {}", parent.display()))?;
        }
        fs::write(path, serialized)
            .with_context(|| format!("write settings {}", path.display()))?;
        info!(target: "config", path = %path.display(), "settings_persisted");
        Ok(())
    }

    /// Repair out-of-range values from a hand-edited file instead of refusing
    /// to start.
    fn sanitized(mut self) -> Self {
        if self.font_size == 0 {
            warn!(target: "config", "font_size_zero_in_file_using_default");
            self.font_size = DEFAULT_FONT_SIZE;
        }
        if self.font_family.trim().is_empty() {
            self.font_family = DEFAULT_FONT_FAMILY.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let settings = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml")));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn defaults_when_file_corrupt() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "theme = {{{{ not toml").unwrap();
        let settings = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quill.toml");
        let mut settings = Settings::default();
        settings.set_theme(Theme::Dark);
        settings.set_font_family("Courier").unwrap();
        settings.set_font_size(16).unwrap();
        settings.persist_to(&path).unwrap();

        let loaded = load_from(Some(path));
        assert_eq!(loaded, settings);
    }

    #[test]
    fn zero_font_size_rejected_and_state_unchanged() {
        let mut settings = Settings::default();
        let err = settings.set_font_size(0).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidFontSize(_)));
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn parse_font_size_rejects_non_numeric_and_non_positive() {
        assert!(Settings::parse_font_size("12").is_ok());
        assert!(Settings::parse_font_size(" 14 ").is_ok());
        assert!(matches!(
            Settings::parse_font_size("0"),
            Err(SettingsError::InvalidFontSize(_))
        ));
        assert!(matches!(
            Settings::parse_font_size("abc"),
            Err(SettingsError::InvalidFontSize(_))
        ));
        assert!(matches!(
            Settings::parse_font_size("-3"),
            Err(SettingsError::InvalidFontSize(_))
        ));
    }

    #[test]
    fn empty_font_family_rejected() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.set_font_family("   "),
            Err(SettingsError::EmptyFontFamily)
        );
        assert_eq!(settings.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn style_follows_theme() {
        let mut settings = Settings::default();
        assert_eq!(settings.style().background, "#ffffff");
        settings.toggle_theme();
        let style = settings.style();
        assert_eq!(style.background, "#1e1e1e");
        assert_eq!(style.foreground, "#d4d4d4");
        assert_eq!(style.font_family, DEFAULT_FONT_FAMILY);
    }

    #[test]
    fn sanitize_repairs_zero_font_size_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "theme = \"dark\"\nfont_family = \"Courier\"\nfont_size = 0\n",
        )
        .unwrap();
        let settings = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }
}
