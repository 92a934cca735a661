//! Error types for the security manager
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use skyward_audit::AuditError;
use skyward_config::ConfigError;
use skyward_keys::KeyError;
use thiserror::Error;

/// Errors surfaced by [`SecurityManager`](crate::SecurityManager)
#[derive(Error, Debug)]
pub enum SecurityError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

pub type SecurityResult<T> = Result<T, SecurityError>;
