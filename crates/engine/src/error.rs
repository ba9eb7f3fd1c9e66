// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scan engine

use thiserror::Error;
use tw_adapters::RegistryError;

/// Errors that abandon a whole scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan abandoned: {0}")]
    Registry(#[from] RegistryError),
}
