//! Layered configuration loading with figment.
//!
//! Sources, lowest priority first:
//!
//! ```text
//! HookcordConfig::default()
//!   └─ hookcord.{profile}.toml | .yaml     (profile variant, if present)
//!        └─ hookcord.toml | .yaml | .yml   (first search dir that has one)
//!             └─ HOOKCORD_* environment    (`__` separates sections)
//!                  └─ ConfigLoader::merge  (programmatic)
//! ```
//!
//! File formats are gated by the `toml-config` (default) and `yaml-config`
//! features. Examples of the environment mapping:
//!
//! - `HOOKCORD_SERVER__PORT=9000` → `server.port`
//! - `HOOKCORD_PLATFORM__PUBLIC_KEY=…` → `platform.public_key`
//! - `HOOKCORD_STREAMING__EDIT_FAILURE_POLICY=abort` → `streaming.edit_failure_policy`

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::HookcordConfig;

/// Prefix of every environment variable read by the loader.
pub const ENV_PREFIX: &str = "HOOKCORD_";

/// Variable selecting the profile when none is set programmatically.
pub const PROFILE_VAR: &str = "HOOKCORD_PROFILE";

const FILE_STEM: &str = "hookcord";

/// Named set of overrides layered under the main file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    /// Name used in file names.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `dev`/`prod` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "production" | "prod" => Self::Production,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads [`PROFILE_VAR`].
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configuration file syntax compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

/// Builder collecting the configuration sources.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .with_current_dir()
///     .profile("production")
///     .load()?;
/// ```
pub struct ConfigLoader {
    profile: Profile,
    search_paths: Vec<PathBuf>,
    file: Option<PathBuf>,
    load_env: bool,
    overrides: Figment,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader reading the environment and no directories yet.
    pub fn new() -> Self {
        Self {
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            file: None,
            load_env: true,
            overrides: Figment::new(),
        }
    }

    /// Sets the profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory searched for `hookcord.*`.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Searches the current directory.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Searches the user config directory (`~/.config/hookcord`).
    pub fn with_user_config_dir(self) -> Self {
        match dirs::config_dir() {
            Some(dir) => self.search_path(dir.join(FILE_STEM)),
            None => self,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Reads `HOOKCORD_*` variables (the default).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Ignores the environment.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` above every other source.
    pub fn merge(mut self, config: HookcordConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Extracts the configuration.
    pub fn load(self) -> ConfigResult<HookcordConfig> {
        let profile = self.profile.clone();
        let config: HookcordConfig = self.into_figment()?.extract()?;

        debug!(
            profile = %profile,
            bind = %config.server.bind_addr(),
            path = %config.server.path,
            scopes = ?config.platform.scopes(),
            "Configuration loaded"
        );
        Ok(config)
    }

    fn into_figment(self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(HookcordConfig::default()));

        for path in self.files()? {
            let Some(format) = FileFormat::from_path(&path) else {
                return Err(ConfigError::Parse(format!(
                    "{} has an unsupported or disabled format",
                    path.display()
                )));
            };
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge_into(figment, &path);
        }

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Reading environment");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment.merge(self.overrides))
    }

    /// Files to merge, lowest priority first.
    fn files(&self) -> ConfigResult<Vec<PathBuf>> {
        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            return Ok(with_profile_variant(path, &self.profile));
        }

        let found = self.search_paths.iter().find_map(|dir| {
            FileFormat::ENABLED
                .iter()
                .flat_map(|format| format.extensions())
                .map(|ext| dir.join(format!("{FILE_STEM}.{ext}")))
                .find(|path| path.exists())
        });

        match found {
            Some(path) => Ok(with_profile_variant(&path, &self.profile)),
            None => {
                warn!(paths = ?self.search_paths, "No configuration file found, using defaults");
                Ok(Vec::new())
            }
        }
    }
}

/// `[dir/hookcord.{profile}.toml, dir/hookcord.toml]`, the variant only if it exists.
fn with_profile_variant(path: &Path, profile: &Profile) -> Vec<PathBuf> {
    let mut files = Vec::with_capacity(2);
    if let Some(variant) = profile_variant(path, profile)
        && variant.exists()
    {
        debug!(path = %variant.display(), profile = %profile, "Found profile variant");
        files.push(variant);
    }
    files.push(path.to_path_buf());
    files
}

fn profile_variant(path: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{profile}.{ext}")))
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<HookcordConfig> {
    ConfigLoader::new().with_current_dir().load()
}

/// Loads configuration from one file plus the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<HookcordConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EditFailurePolicy, LogLevel};

    /// A fresh directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hookcord-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_defaults_without_files() {
        let config = ConfigLoader::new()
            .search_path("/nonexistent/hookcord")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.path, "/");
    }

    #[test]
    fn test_programmatic_override_wins() {
        let mut overrides = HookcordConfig::default();
        overrides.server.port = 9100;
        overrides.streaming.rate_limit_ms = 250;

        let config = ConfigLoader::new()
            .search_path("/nonexistent/hookcord")
            .without_env()
            .merge(overrides)
            .load()
            .unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.streaming.rate_limit_ms, 250);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::new()
            .file("/nonexistent/hookcord.toml")
            .without_env()
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_main_file_overrides_profile_variant() {
        let dir = scratch_dir("layers");
        std::fs::write(
            dir.join("hookcord.toml"),
            "[server]\nport = 9000\n[platform]\napplication_id = 1234\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("hookcord.production.toml"),
            "[server]\nport = 7000\npath = \"/interactions\"\n[streaming]\nedit_failure_policy = \"abort\"\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .search_path(&dir)
            .profile("prod")
            .without_env()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.path, "/interactions");
        assert_eq!(config.platform.application_id, "1234");
        assert_eq!(config.streaming.edit_failure_policy, EditFailurePolicy::Abort);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_profile_parse_and_variant() {
        assert_eq!(Profile::parse("prod"), Profile::Production);
        assert_eq!(Profile::parse(" Staging "), Profile::Custom("staging".into()));
        assert_eq!(
            profile_variant(Path::new("/etc/hookcord.toml"), &Profile::Production),
            Some(PathBuf::from("/etc/hookcord.production.toml"))
        );
    }
}
