// Copyright 2023 IOTA Stiftung
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to read input: {0}")]
    Input(std::io::Error),
    #[error("failed to write output: {0}")]
    Output(std::io::Error),
    #[error("failed to encode response: {0}")]
    Response(#[from] serde_json::Error),
}
