//! Configuration file support for clan-inspector.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (`CLAN_INSPECTOR_` prefix, `__` between section and
//!    key, e.g. `CLAN_INSPECTOR_BUNGIE__API_KEY`)
//! 3. `./ClanInspector.yaml`, then `./clan-inspector.toml`, then
//!    `~/.config/clan-inspector/config.toml`
//! 4. Built-in defaults
//!
//! `ClanInspector.yaml` may use either the sectioned layout below or the flat
//! keys of the first release (`APIKey`, `ClanID`, `MembershipType`,
//! `ActivityBatchSize`, `ActivityAgeCutoff`).
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "sqlite:///var/lib/clan-inspector/clan.db?mode=rwc"  # optional
//!
//! [bungie]
//! api_key = "..."        # or CLAN_INSPECTOR_BUNGIE__API_KEY
//! clan_id = "1234567"
//! membership_type = 3    # Steam
//! requests_per_second = 20
//!
//! [sync]
//! activity_age_cutoff_hours = 1
//! page_limit = 10
//!
//! [report]
//! time_zone = "America/New_York"
//! ```

use std::path::PathBuf;

use clan_inspector::bungie::{DEFAULT_ACTIVITY_BATCH_SIZE, DEFAULT_BASE_URL};
use clan_inspector::platform::rate_limits;
use clan_inspector::sync::DEFAULT_ACTIVITY_AGE_CUTOFF_HOURS;
use config::{Config as ConfigBuilder, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

const APP_NAME: &str = "clan-inspector";
const LEGACY_YAML: &str = "ClanInspector.yaml";
const DEFAULT_TIME_ZONE: &str = "Europe/London";

type Builder = config::builder::ConfigBuilder<config::builder::DefaultState>;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub bungie: BungieConfig,
    pub sync: SyncConfig,
    pub report: ReportConfig,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL. Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
}

/// Bungie.net API access.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BungieConfig {
    /// Application API key from bungie.net/en/Application.
    pub api_key: Option<String>,
    /// Clan (group) id used by the roster refresh.
    pub clan_id: Option<String>,
    /// Platform membership type of the clan's members.
    pub membership_type: i32,
    /// Activity history page size.
    pub activity_batch_size: u32,
    pub base_url: String,
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for BungieConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            clan_id: None,
            membership_type: 4,
            activity_batch_size: DEFAULT_ACTIVITY_BATCH_SIZE,
            base_url: DEFAULT_BASE_URL.to_string(),
            requests_per_second: rate_limits::BUNGIE_DEFAULT_RPS,
            timeout_secs: 30,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Skip characters played within this many hours of their last sync.
    pub activity_age_cutoff_hours: i64,
    /// Stop history discovery after this many pages per character.
    pub page_limit: Option<u32>,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            activity_age_cutoff_hours: DEFAULT_ACTIVITY_AGE_CUTOFF_HOURS,
            page_limit: None,
            no_rate_limit: false,
        }
    }
}

/// Report rendering.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// IANA zone the play-hours report buckets local hours in.
    pub time_zone: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            time_zone: DEFAULT_TIME_ZONE.to_string(),
        }
    }
}

/// Flat keys of a first-release `ClanInspector.yaml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyConfig {
    #[serde(rename = "APIKey")]
    api_key: Option<String>,
    #[serde(rename = "ClanID")]
    clan_id: Option<String>,
    /// Written as a string in old files; either form parses.
    #[serde(rename = "MembershipType")]
    membership_type: Option<i32>,
    #[serde(rename = "ActivityBatchSize")]
    activity_batch_size: Option<u32>,
    /// Hours.
    #[serde(rename = "ActivityAgeCutoff")]
    activity_age_cutoff: Option<i64>,
    #[serde(rename = "MongoDB")]
    mongo_db: Option<String>,
}

impl LegacyConfig {
    fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        ConfigBuilder::builder()
            .add_source(File::from_str(content, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    /// The flat values under their section keys, or `None` if the file has
    /// none of them.
    fn into_source(self) -> Result<Option<ConfigBuilder>, ConfigError> {
        if let Some(url) = &self.mongo_db {
            tracing::warn!(
                "Ignoring MongoDB = {:?} in {}; set database.url instead",
                url,
                LEGACY_YAML
            );
        }
        if self.api_key.is_none()
            && self.clan_id.is_none()
            && self.membership_type.is_none()
            && self.activity_batch_size.is_none()
            && self.activity_age_cutoff.is_none()
        {
            return Ok(None);
        }

        ConfigBuilder::builder()
            .set_override_option("bungie.api_key", self.api_key)?
            .set_override_option("bungie.clan_id", self.clan_id)?
            .set_override_option("bungie.membership_type", self.membership_type)?
            .set_override_option("bungie.activity_batch_size", self.activity_batch_size)?
            .set_override_option("sync.activity_age_cutoff_hours", self.activity_age_cutoff)?
            .build()
            .map(Some)
    }
}

/// Add a `ClanInspector.yaml` layer, reading sectioned and flat keys alike.
fn add_yaml_layer(builder: Builder, content: &str) -> Builder {
    let builder = builder.add_source(File::from_str(content, FileFormat::Yaml));
    match LegacyConfig::from_yaml(content).and_then(LegacyConfig::into_source) {
        Ok(Some(legacy)) => {
            tracing::debug!("Mapped first-release keys from {}", LEGACY_YAML);
            builder.add_source(legacy)
        }
        Ok(None) => builder,
        Err(e) => {
            tracing::warn!("Failed to read flat keys from {}: {}", LEGACY_YAML, e);
            builder
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/clan-inspector/config.toml)
    /// 3. Local config file (./clan-inspector.toml)
    /// 4. Local YAML file (./ClanInspector.yaml), sectioned or first-release flat keys
    /// 5. Environment variables with the CLAN_INSPECTOR_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local = PathBuf::from("clan-inspector.toml");
        if local.exists() {
            tracing::debug!("Loading config from ./clan-inspector.toml");
            builder = builder.add_source(File::from(local).format(FileFormat::Toml).required(false));
        }

        let legacy = PathBuf::from(LEGACY_YAML);
        if legacy.exists() {
            tracing::debug!("Loading config from ./{}", LEGACY_YAML);
            match std::fs::read_to_string(&legacy) {
                Ok(content) => builder = add_yaml_layer(builder, &content),
                Err(e) => tracing::warn!("Failed to read ./{}: {}", LEGACY_YAML, e),
            }
        }

        // CLAN_INSPECTOR_BUNGIE__API_KEY -> bungie.api_key
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("CLAN_INSPECTOR")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The default carries `mode=rwc` so SQLite creates the file on first use.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("clan-inspector.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Get the API key, or an error naming where to set it.
    pub fn api_key(&self) -> Result<&str, String> {
        self.bungie
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                "No Bungie.net API key configured. Set bungie.api_key or \
                 CLAN_INSPECTOR_BUNGIE__API_KEY."
                    .to_string()
            })
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/clan-inspector` or
    /// `~/.local/state/clan-inspector`. Elsewhere it falls back to the data
    /// directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
