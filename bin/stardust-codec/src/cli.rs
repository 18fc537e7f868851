// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use clap::Parser;

use crate::config::{ConfigError, StardustConfig};

/// Answers Stardust codec messages, one JSON object per line.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct ClArgs {
    /// The location of the configuration file.
    #[arg(short, long, env = "CONFIG_PATH")]
    pub config: Option<String>,
    /// Read messages from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<String>,
    /// A JSON file holding the protocol parameters.
    #[arg(long, env = "PROTOCOL_PARAMETERS_PATH")]
    pub protocol_parameters: Option<String>,
    /// The number of derived identifiers to cache.
    #[arg(long, env = "CACHE_CAPACITY")]
    pub cache_capacity: Option<usize>,
}

impl ClArgs {
    /// Get a config file with CLI args applied.
    pub fn get_config(&self) -> Result<StardustConfig, ConfigError> {
        let mut config = self
            .config
            .as_ref()
            .map(StardustConfig::from_file)
            .transpose()?
            .unwrap_or_default();

        if let Some(path) = &self.protocol_parameters {
            config.protocol.parameters_path = Some(path.clone());
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache.capacity = capacity;
        }

        Ok(config)
    }
}
