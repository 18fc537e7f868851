// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use stardust_codec::{derive::DerivationCache, model::ProtocolParameters};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at '{0}': {1}")]
    FileRead(String, std::io::Error),
    #[error("toml deserialization failed: {0}")]
    TomlDeserialization(toml::de::Error),
    #[error("failed to read protocol parameters at '{0}': {1}")]
    ProtocolParametersRead(String, std::io::Error),
    #[error("invalid protocol parameters in '{0}': {1}")]
    ProtocolParametersDeserialization(String, serde_json::Error),
}

#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub parameters_path: Option<String>,
}

impl ProtocolConfig {
    /// Loads the configured protocol parameters, falling back to the Shimmer defaults.
    pub fn load(&self) -> Result<ProtocolParameters, ConfigError> {
        match &self.parameters_path {
            Some(path) => fs::read_to_string(path)
                .map_err(|e| ConfigError::ProtocolParametersRead(path.clone(), e))
                .and_then(|contents| {
                    serde_json::from_str(&contents)
                        .map_err(|e| ConfigError::ProtocolParametersDeserialization(path.clone(), e))
                }),
            None => Ok(ProtocolParameters::default()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DerivationCache::DEFAULT_CAPACITY,
        }
    }
}

/// Configuration of the codec service.
#[derive(Clone, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StardustConfig {
    pub protocol: ProtocolConfig,
    pub cache: CacheConfig,
}

impl StardustConfig {
    /// Reads the config from the file located at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        fs::read_to_string(&path)
            .map_err(|e| ConfigError::FileRead(path.as_ref().display().to_string(), e))
            .and_then(|contents| toml::from_str::<Self>(&contents).map_err(ConfigError::TomlDeserialization))
    }
}
