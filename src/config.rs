//! Build configuration loading (ambient: §10.2).
//!
//! Grounded on `accumulators.rs`'s `AccumulatorParser`: a config-file path is
//! parsed with `toml::from_str` into a `serde`-derived struct. Unlike the
//! teacher, which dispatches on an `accumulator_type` tag to pick between
//! accumulator variants, this crate has a single flat config shape, so no
//! tag-based enum is needed.
//!
//! Example:
//! ```
//! use quadgeo::config::ConfigParser;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("./quadgeo.toml");
//! // A missing path is not itself an error; only a malformed file is.
//! let config = ConfigParser::from_config_file_path_opt(None).parse().unwrap();
//! assert_eq!(config.precision.as_u8(), quadgeo::quantize::DEFAULT_PRECISION);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::builder::BuildConfig;
use crate::quantize::Precision;

/// The TOML-deserializable shape of a `BuildConfig`; every field is optional
/// so a file may override only a subset, with the rest filled from
/// `BuildConfig::default()`.
#[derive(Deserialize, Debug, Default)]
pub struct BuildConfigFile {
    pub precision: Option<u8>,
    pub sample_k: Option<u32>,
    pub brute_force_threshold: Option<u64>,
    pub max_depth: Option<u32>,
    pub rng_seed: Option<u64>,
    pub max_thread_count: Option<u8>,
    pub namespace: Option<String>,
    pub zero_elision: Option<bool>,
}

impl BuildConfigFile {
    fn into_build_config(self) -> Result<BuildConfig, ConfigError> {
        let default = BuildConfig::default();
        Ok(BuildConfig {
            precision: match self.precision {
                Some(p) => Precision::new(p)?,
                None => default.precision,
            },
            sample_k: self.sample_k.unwrap_or(default.sample_k),
            brute_force_threshold: self
                .brute_force_threshold
                .unwrap_or(default.brute_force_threshold),
            max_depth: self.max_depth.unwrap_or(default.max_depth),
            rng_seed: self.rng_seed.unwrap_or(default.rng_seed),
            max_thread_count: self.max_thread_count.unwrap_or(default.max_thread_count),
            namespace: self.namespace.unwrap_or(default.namespace),
            zero_elision: self.zero_elision.unwrap_or(default.zero_elision),
        })
    }
}

/// Parser requires either a valid path to a TOML file, or no path at all (in
/// which case parsing simply returns the defaults).
pub struct ConfigParser {
    config_file_path: Option<PathBuf>,
}

impl ConfigParser {
    pub fn from_config_file_path_opt(path: Option<PathBuf>) -> Self {
        ConfigParser {
            config_file_path: path,
        }
    }

    pub fn from_config_file_path(path: PathBuf) -> Self {
        Self::from_config_file_path_opt(Some(path))
    }

    /// Reads and parses the config file (if a path was given), then layers
    /// it over `BuildConfig::default()`. An error is returned if the path
    /// was given but could not be opened/read, has an unsupported
    /// extension, or fails to deserialize.
    pub fn parse(self) -> Result<BuildConfig, ConfigError> {
        let Some(path) = self.config_file_path else {
            return Ok(BuildConfig::default());
        };

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or(ConfigError::UnknownFileType)?;

        if ext != "toml" {
            return Err(ConfigError::UnsupportedFileType { ext: ext.to_string() });
        }

        let mut buf = String::new();
        File::open(&path)?.read_to_string(&mut buf)?;
        let file: BuildConfigFile = toml::from_str(&buf)?;
        file.into_build_config()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unable to determine file extension for config path")]
    UnknownFileType,
    #[error("the file type with extension {ext:?} is not supported, expected .toml")]
    UnsupportedFileType { ext: String },
    #[error("error reading config file: {0}")]
    FileReadError(#[from] std::io::Error),
    #[error("error deserializing config file: {0}")]
    DeserializationError(#[from] toml::de::Error),
    #[error("invalid precision in config file: {0}")]
    InvalidPrecision(#[from] crate::quantize::PrecisionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_returns_defaults() {
        let config = ConfigParser::from_config_file_path_opt(None).parse().unwrap();
        assert_eq!(config.precision, BuildConfig::default().precision);
    }

    #[test]
    fn partial_toml_overrides_only_given_fields() {
        let file: BuildConfigFile = toml::from_str("sample_k = 4\n").unwrap();
        let config = file.into_build_config().unwrap();
        assert_eq!(config.sample_k, 4);
        assert_eq!(config.max_depth, BuildConfig::default().max_depth);
    }
}
