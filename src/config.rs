use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// RGB color representation for config
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Bitbucket credentials: username plus an app password
/// (https://bitbucket.org/account/settings/app-passwords/)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub username: String,
    pub app_password: String,
}

impl AuthSettings {
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.app_password.is_empty()
    }
}

/// Default repository to list PRs from when none is given on the
/// command line, as "workspace" + "repo" slugs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsSettings {
    pub workspace: String,
    pub repo: String,
}

impl DefaultsSettings {
    pub fn slug(&self) -> Option<(String, String)> {
        if self.workspace.is_empty() || self.repo.is_empty() {
            None
        } else {
            Some((self.workspace.clone(), self.repo.clone()))
        }
    }
}

/// Diff color settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffColors {
    /// Background tint for added lines
    pub add_bg: RgbColor,

    /// Background tint for deleted lines
    pub del_bg: RgbColor,

    /// Background tint for info/context lines
    pub info_bg: RgbColor,

    /// Base background of the diff container
    pub base_bg: RgbColor,

    /// Accent color for headers and active elements
    pub accent: RgbColor,
}

impl Default for DiffColors {
    fn default() -> Self {
        Self {
            add_bg: RgbColor::new(30, 60, 30),
            del_bg: RgbColor::new(60, 30, 30),
            info_bg: RgbColor::new(28, 34, 50),
            base_bg: RgbColor::new(22, 22, 22),
            accent: RgbColor::new(0, 82, 204),
        }
    }
}

/// Navigation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Number of lines scrolled by half-page movements
    pub scroll_lines: usize,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self { scroll_lines: 15 }
    }
}

/// Review screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    /// Start every file section collapsed on the review screen
    pub collapse_by_default: bool,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            collapse_by_default: false,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub auth: AuthSettings,
    pub defaults: DefaultsSettings,
    pub colors: DiffColors,
    pub navigation: NavigationSettings,
    pub review: ReviewSettings,
}

impl Config {
    /// Get the config file path (~/.config/bbtui/config.toml)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("bbtui").join("config.toml"))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Self {
        let path = match Self::config_path() {
            Some(p) => p,
            None => return Self::default(),
        };

        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.auth.is_configured());
        assert!(config.defaults.slug().is_none());
        assert!(!config.review.collapse_by_default);
        assert_eq!(config.navigation.scroll_lines, 15);
    }

    #[test]
    fn test_diff_colors_defaults() {
        let config = Config::default();
        assert_eq!(config.colors.add_bg.r, 30);
        assert_eq!(config.colors.add_bg.g, 60);
        assert_eq!(config.colors.add_bg.b, 30);
        assert_eq!(config.colors.del_bg.r, 60);
        assert_eq!(config.colors.del_bg.g, 30);
        assert_eq!(config.colors.del_bg.b, 30);
        assert_eq!(config.colors.info_bg.b, 50);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[auth]
username = "alex"
app_password = "abcd1234"

[defaults]
workspace = "acme"
repo = "widgets"
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.auth.is_configured());
        assert_eq!(config.auth.username, "alex");
        assert_eq!(
            config.defaults.slug(),
            Some(("acme".to_string(), "widgets".to_string()))
        );
    }

    #[test]
    fn test_parse_toml_partial() {
        // Missing sections fall back to defaults
        let toml_str = r#"
[review]
collapse_by_default = true
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.review.collapse_by_default);
        assert!(!config.auth.is_configured());
        assert_eq!(config.navigation.scroll_lines, 15);
    }

    #[test]
    fn test_parse_toml_with_colors() {
        let toml_str = r#"
[colors]
add_bg = { r = 0, g = 100, b = 0 }
del_bg = { r = 100, g = 0, b = 0 }
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.colors.add_bg.g, 100);
        assert_eq!(config.colors.del_bg.r, 100);
        // Untouched colors keep defaults
        assert_eq!(config.colors.base_bg.r, 22);
    }

    #[test]
    fn test_parse_toml_with_navigation() {
        let toml_str = r#"
[navigation]
scroll_lines = 20
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.navigation.scroll_lines, 20);
    }

    #[test]
    fn test_auth_is_configured_requires_both() {
        let mut auth = AuthSettings::default();
        assert!(!auth.is_configured());
        auth.username = "alex".to_string();
        assert!(!auth.is_configured());
        auth.app_password = "pw".to_string();
        assert!(auth.is_configured());
    }

    #[test]
    fn test_defaults_slug_requires_both() {
        let mut defaults = DefaultsSettings::default();
        defaults.workspace = "acme".to_string();
        assert!(defaults.slug().is_none());
        defaults.repo = "widgets".to_string();
        assert!(defaults.slug().is_some());
    }

    #[test]
    fn test_rgb_color_new() {
        let color = RgbColor::new(255, 128, 64);
        assert_eq!(color.r, 255);
        assert_eq!(color.g, 128);
        assert_eq!(color.b, 64);
    }
}
