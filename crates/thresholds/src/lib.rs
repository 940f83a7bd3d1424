//! Persisted threshold configuration.
//!
//! Edits are validated before they touch the stored record; a rejected edit
//! leaves both the in-memory config and the file untouched. Ordering is
//! enforced on write only, so a hand-edited file loads as-is.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{ThresholdConfig, ThresholdViolation};
use thiserror::Error;

pub type ThresholdResult<T> = Result<T, ThresholdError>;

#[derive(Debug, Error)]
pub enum ThresholdError {
    #[error("invalid thresholds: {0}")]
    Invalid(#[from] ThresholdViolation),

    #[error("{field} must be a finite number")]
    NotANumber { field: &'static str },

    #[error("threshold file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("threshold file {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode thresholds: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct ThresholdStore {
    config: ThresholdConfig,
    path: Option<PathBuf>,
}

impl ThresholdStore {
    /// A store that never touches the filesystem.
    pub fn in_memory(config: ThresholdConfig) -> Self {
        Self { config, path: None }
    }

    /// Loads the record at `path`, falling back to defaults when it doesn't exist yet.
    pub fn load(path: impl Into<PathBuf>) -> ThresholdResult<Self> {
        let path = path.into();
        let config = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| ThresholdError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no thresholds at {}, using defaults", path.display());
                ThresholdConfig::default()
            }
            Err(source) => return Err(ThresholdError::Io { path, source }),
        };

        if let Err(violation) = config.validate() {
            log::warn!("thresholds loaded from {} are not ordered: {violation}", path.display());
        }

        Ok(Self {
            config,
            path: Some(path),
        })
    }

    pub fn config(&self) -> ThresholdConfig {
        self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Requires `0 < fresh < ripe`.
    pub fn set_fresh(&mut self, fresh: f64) -> ThresholdResult<()> {
        let fresh = finite("fresh", fresh)?;
        if !(fresh > 0.0) {
            return self.reject(ThresholdViolation::FreshNotPositive);
        }
        if !(fresh < self.config.ripe) {
            return self.reject(ThresholdViolation::FreshNotBelowRipe);
        }
        self.commit(ThresholdConfig { fresh, ..self.config })
    }

    /// Requires `fresh < ripe < overripe`.
    pub fn set_ripe(&mut self, ripe: f64) -> ThresholdResult<()> {
        let ripe = finite("ripe", ripe)?;
        if !(self.config.fresh < ripe) {
            return self.reject(ThresholdViolation::FreshNotBelowRipe);
        }
        if !(ripe < self.config.overripe) {
            return self.reject(ThresholdViolation::RipeNotBelowOverripe);
        }
        self.commit(ThresholdConfig { ripe, ..self.config })
    }

    /// Requires `overripe > ripe`.
    pub fn set_overripe(&mut self, overripe: f64) -> ThresholdResult<()> {
        let overripe = finite("overripe", overripe)?;
        if !(self.config.ripe < overripe) {
            return self.reject(ThresholdViolation::RipeNotBelowOverripe);
        }
        self.commit(ThresholdConfig { overripe, ..self.config })
    }

    pub fn set_zero_point(&mut self, zero_point: f64) -> ThresholdResult<()> {
        let zero_point = finite("zeroPoint", zero_point)?;
        self.commit(ThresholdConfig { zero_point, ..self.config })
    }

    /// Swaps in a whole record; it must satisfy the full ordering.
    pub fn replace(&mut self, config: ThresholdConfig) -> ThresholdResult<()> {
        if let Err(violation) = config.validate() {
            return self.reject(violation);
        }
        self.commit(config)
    }

    /// Writes the current record. No-op for in-memory stores.
    pub fn save(&self) -> ThresholdResult<()> {
        match &self.path {
            Some(path) => write_config(path, &self.config),
            None => Ok(()),
        }
    }

    fn commit(&mut self, candidate: ThresholdConfig) -> ThresholdResult<()> {
        // File first, so a failed write leaves the in-memory record as it was.
        if let Some(path) = &self.path {
            write_config(path, &candidate)?;
        }
        log::info!(
            "thresholds updated: fresh={} ripe={} overripe={} zeroPoint={}",
            candidate.fresh,
            candidate.ripe,
            candidate.overripe,
            candidate.zero_point
        );
        self.config = candidate;
        Ok(())
    }

    fn reject(&self, violation: ThresholdViolation) -> ThresholdResult<()> {
        log::warn!("rejected threshold edit: {violation}");
        Err(ThresholdError::Invalid(violation))
    }
}

fn finite(field: &'static str, value: f64) -> ThresholdResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ThresholdError::NotANumber { field })
    }
}

fn write_config(path: &Path, config: &ThresholdConfig) -> ThresholdResult<()> {
    let io_err = |source| ThresholdError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let text = serde_json::to_string_pretty(config).map_err(ThresholdError::Encode)?;
    fs::write(path, text).map_err(io_err)?;
    log::debug!("thresholds written to {}", path.display());
    Ok(())
}
