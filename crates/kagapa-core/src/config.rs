//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Typed sections (`bloom`, `store`) fall back to their defaults when absent.
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("."))
    }

    /// Like [`load`](Self::load) but resolves the TOML files against `base`.
    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// `get`, or `default` when `key` is not configured at all.
    pub fn get_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        if self.figment.contains(key) { self.get(key) } else { Ok(default) }
    }

    pub fn bloom(&self) -> anyhow::Result<BloomSettings> {
        self.get_or("bloom", BloomSettings::default())
    }

    pub fn store(&self) -> anyhow::Result<StoreSettings> {
        self.get_or("store", StoreSettings::default())
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let bloom = self.bloom()?;
        if !(bloom.error_rate > 0.0 && bloom.error_rate < 1.0) {
            return Err(anyhow::anyhow!("bloom.error_rate must be in (0, 1), got {}", bloom.error_rate));
        }
        if bloom.capacity == 0 || bloom.batch_size == 0 {
            return Err(anyhow::anyhow!("bloom.capacity and bloom.batch_size must be positive"));
        }
        match env {
            "prod" | "production" => {
                if self.store()?.path.is_none() {
                    return Err(anyhow::anyhow!("Prod config needs store.path; an in-memory store loses every word on exit"));
                }
            }
            "dev" | "development" => {}
            "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

/// Sizing of the dictionary existence index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomSettings {
    pub capacity: usize,
    pub error_rate: f64,
    /// Words fetched from the store per round trip during a rebuild.
    pub batch_size: usize,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self { capacity: 1_000_000, error_rate: 0.001, batch_size: 10_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// JSON snapshot file; `None` keeps the dictionary in memory only.
    pub path: Option<String>,
    /// Commits appended to the journal before the snapshot is rewritten.
    pub compact_every: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { path: None, compact_every: 10_000 }
    }
}

impl StoreSettings {
    pub fn resolved_path(&self, base: &Path) -> Option<PathBuf> {
        self.path.as_deref().map(|p| resolve_with_base(base, p))
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
