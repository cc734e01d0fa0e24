//! Engine configuration.
//!
//! Loaded from built-in defaults, an optional TOML file and `SATISFACTION__*`
//! environment variables, in increasing order of precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::defuzz::Defuzzification;
use crate::error::{FuzzyError, FuzzyResult};
use crate::satisfaction::{UNIVERSE_MAX, UNIVERSE_MIN};
use crate::universe::Universe;

/// Environment variable naming the config file (without extension is fine).
pub const CONFIG_PATH_ENV: &str = "SATISFACTION_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/satisfaction";

/// Prefix for environment overrides, e.g. `SATISFACTION__UNIVERSE_STEP=0.1`.
pub const ENV_PREFIX: &str = "SATISFACTION";

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Spacing of the `[0, 10]` universes.
    pub universe_step: f64,
    /// Defuzzification method.
    pub defuzzification: Defuzzification,
    /// Worker threads for batch evaluation.
    pub workers: usize,
    /// Maximum queued jobs for batch evaluation.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            universe_step: 1.0,
            defuzzification: Defuzzification::Centroid,
            workers: 2,
            queue_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// Loads config. Precedence: env `SATISFACTION__*` > file at
    /// `SATISFACTION_CONFIG` (or `config/satisfaction`) > defaults.
    ///
    /// # Errors
    ///
    /// Returns `FuzzyError::Config` if a source cannot be read or parsed, and
    /// a validation error if the resulting values are unusable.
    pub fn load() -> FuzzyResult<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path), Some(Self::environment()))
    }

    /// Like [`EngineConfig::load`], but reads overrides from `vars` instead of
    /// the process environment. Keys keep the `SATISFACTION__` prefix.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::load`].
    pub fn load_with_env<K, V>(
        path: impl AsRef<Path>,
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> FuzzyResult<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load_from(path.as_ref(), Some(Self::environment().source(Some(vars))))
    }

    /// Loads config from one explicit file (plus defaults, no environment).
    ///
    /// # Errors
    ///
    /// Returns `FuzzyError::Config` if the file is missing or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> FuzzyResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FuzzyError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::load_from(path, None)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
    }

    fn load_from(path: &Path, env: Option<config::Environment>) -> FuzzyResult<Self> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("universe_step", defaults.universe_step)?
            .set_default("defuzzification", defaults.defuzzification.name())?
            .set_default("workers", 2_i64)?
            .set_default("queue_capacity", 1024_i64)?;

        // The config crate resolves extensionless paths; require the file only
        // when the exact path exists.
        let mut builder = builder.add_source(config::File::from(path).required(path.exists()));
        if let Some(env) = env {
            builder = builder.add_source(env);
        }

        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        tracing::debug!(
            step = loaded.universe_step,
            method = %loaded.defuzzification,
            workers = loaded.workers,
            "engine config loaded"
        );
        Ok(loaded)
    }

    /// Checks that the values can drive an engine.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidStep` for an unusable step and
    /// `FuzzyError::Config` for zero workers or queue capacity.
    pub fn validate(&self) -> FuzzyResult<()> {
        Universe::point_count(UNIVERSE_MIN, UNIVERSE_MAX, self.universe_step)?;
        if self.workers == 0 {
            return Err(FuzzyError::Config("workers must be at least 1".to_string()));
        }
        if self.queue_capacity == 0 {
            return Err(FuzzyError::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
