//! Skyward security core
//!
//! Encrypts sensitive fields of loosely typed records and records
//! security-relevant actions in an append-only audit trail.
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


pub mod error;
pub mod manager;
pub mod policy;

pub use error::{SecurityError, SecurityResult};
pub use manager::{KeyInfo, Record, SecurityManager};
pub use policy::{classify_severity, is_sensitive_field, SENSITIVE_KEYWORDS};

pub use skyward_audit::{AuditEvent, Severity};
pub use skyward_config::SecurityConfig;
