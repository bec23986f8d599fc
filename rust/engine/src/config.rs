use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::player::Chips;

/// Deadlines for the two commit-reveal phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolTimeouts {
    pub commit_timeout_ms: u64,
    pub reveal_timeout_ms: u64,
}

impl Default for ProtocolTimeouts {
    fn default() -> Self {
        Self {
            commit_timeout_ms: 10_000,
            reveal_timeout_ms: 10_000,
        }
    }
}

/// Stakes and limits for one table. Mirrors the session settings chosen by
/// the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub buy_in_min: Chips,
    pub buy_in_max: Chips,
    pub seat_max: usize,
    /// House fee in basis points of each pot (0 disables rake).
    pub rake_bps: u32,
    /// Upper bound on rake per hand.
    pub rake_cap: Option<Chips>,
    pub protocol: ProtocolTimeouts,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            small_blind: 50,
            big_blind: 100,
            buy_in_min: 2_000,
            buy_in_max: 20_000,
            seat_max: 9,
            rake_bps: 0,
            rake_cap: None,
            protocol: ProtocolTimeouts::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub small_blind: ValueSource,
    pub big_blind: ValueSource,
    pub seat_max: ValueSource,
    pub rake_bps: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            small_blind: ValueSource::Default,
            big_blind: ValueSource::Default,
            seat_max: ValueSource::Default,
            rake_bps: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: TableConfig,
    pub sources: ConfigSources,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub const CONFIG_PATH_ENV: &str = "POKER_CORE_CONFIG";

impl TableConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TableConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 || self.big_blind == 0 {
            return Err(ConfigError::Invalid("blinds must be positive".into()));
        }
        if self.small_blind > self.big_blind {
            return Err(ConfigError::Invalid(
                "small blind cannot exceed big blind".into(),
            ));
        }
        if self.buy_in_min > self.buy_in_max {
            return Err(ConfigError::Invalid("buy_in_min exceeds buy_in_max".into()));
        }
        if self.buy_in_min < self.big_blind {
            return Err(ConfigError::Invalid(
                "buy_in_min must cover the big blind".into(),
            ));
        }
        // two hole cards per seat plus 5 board cards and 3 burns must fit in 52
        if !(2..=22).contains(&self.seat_max) {
            return Err(ConfigError::Invalid("seat_max must be in 2..=22".into()));
        }
        if self.rake_bps > 10_000 {
            return Err(ConfigError::Invalid("rake_bps cannot exceed 10000".into()));
        }
        if self.protocol.commit_timeout_ms == 0 || self.protocol.reveal_timeout_ms == 0 {
            return Err(ConfigError::Invalid("protocol timeouts must be positive".into()));
        }
        Ok(())
    }
}

pub fn load() -> Result<TableConfig, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

/// Defaults, then the TOML file named by `POKER_CORE_CONFIG`, then
/// `POKER_CORE_*` environment overrides.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = TableConfig::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let s = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&s)?;
        file.apply(&mut cfg, &mut sources);
    }

    if let Some(v) = env_parse::<Chips>("POKER_CORE_SMALL_BLIND")? {
        cfg.small_blind = v;
        sources.small_blind = ValueSource::Env;
    }
    if let Some(v) = env_parse::<Chips>("POKER_CORE_BIG_BLIND")? {
        cfg.big_blind = v;
        sources.big_blind = ValueSource::Env;
    }
    if let Some(v) = env_parse::<usize>("POKER_CORE_SEAT_MAX")? {
        cfg.seat_max = v;
        sources.seat_max = ValueSource::Env;
    }
    if let Some(v) = env_parse::<u32>("POKER_CORE_RAKE_BPS")? {
        cfg.rake_bps = v;
        sources.rake_bps = ValueSource::Env;
    }

    cfg.validate()?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("Invalid {}", key))),
        _ => Ok(None),
    }
}

// File layer keeps every field optional so sources can be tracked.
#[derive(Debug, Deserialize)]
struct FileConfig {
    small_blind: Option<Chips>,
    big_blind: Option<Chips>,
    buy_in_min: Option<Chips>,
    buy_in_max: Option<Chips>,
    seat_max: Option<usize>,
    rake_bps: Option<u32>,
    rake_cap: Option<Chips>,
    protocol: Option<ProtocolTimeouts>,
}

impl FileConfig {
    fn apply(self, cfg: &mut TableConfig, sources: &mut ConfigSources) {
        if let Some(v) = self.small_blind {
            cfg.small_blind = v;
            sources.small_blind = ValueSource::File;
        }
        if let Some(v) = self.big_blind {
            cfg.big_blind = v;
            sources.big_blind = ValueSource::File;
        }
        if let Some(v) = self.seat_max {
            cfg.seat_max = v;
            sources.seat_max = ValueSource::File;
        }
        if let Some(v) = self.rake_bps {
            cfg.rake_bps = v;
            sources.rake_bps = ValueSource::File;
        }
        if let Some(v) = self.buy_in_min {
            cfg.buy_in_min = v;
        }
        if let Some(v) = self.buy_in_max {
            cfg.buy_in_max = v;
        }
        if self.rake_cap.is_some() {
            cfg.rake_cap = self.rake_cap;
        }
        if let Some(v) = self.protocol {
            cfg.protocol = v;
        }
    }
}
