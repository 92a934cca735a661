//! Security manager: the surface the rest of the CLI talks to
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


use crate::error::{SecurityError, SecurityResult};
use crate::policy::{classify_severity, is_sensitive_field};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{Map, Value};
use skyward_audit::{AuditEvent, AuditLogger};
use skyward_config::{KeyManagementMode, SecurityConfig};
use skyward_keys::{Encryptor, KeyManager};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Loosely typed record handed in by callers
pub type Record = Map<String, Value>;

/// Name and fingerprint of a stored key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub name: String,
    pub fingerprint: String,
}

/// Composes the key store, the encryptor and the audit log.
///
/// The key store is opened lazily the first time a key is needed, so a
/// process running with encryption disabled never touches it.
pub struct SecurityManager {
    config: SecurityConfig,
    encryptor: OnceCell<Encryptor>,
    audit: AuditLogger,
}

impl SecurityManager {
    /// Build a manager; fails if the audit log cannot be opened
    pub async fn new(config: SecurityConfig) -> SecurityResult<Self> {
        let audit =
            AuditLogger::open(&config.audit_log_path, config.audit_logging_enabled).await?;

        info!(
            encryption = config.encryption_enabled,
            audit_logging = config.audit_logging_enabled,
            key_management = %config.key_management_mode,
            "Security manager initialized"
        );

        Ok(Self {
            config,
            encryptor: OnceCell::new(),
            audit,
        })
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    async fn encryptor(&self) -> SecurityResult<&Encryptor> {
        self.encryptor
            .get_or_try_init(|| async {
                let keys = match self.config.key_management_mode {
                    KeyManagementMode::Local => {
                        KeyManager::open(&self.config.key_store_path, self.config.default_key.clone())
                            .await?
                    }
                };
                Ok::<_, SecurityError>(Encryptor::new(Arc::new(keys)))
            })
            .await
    }

    /// Encrypt every sensitive field of `record` under the default key.
    ///
    /// Sensitive values are JSON-serialized, encrypted and replaced by the
    /// base64 of the payload; other fields pass through. The record is
    /// returned unchanged when encryption is disabled. On error the partially
    /// transformed record is dropped.
    pub async fn encrypt_sensitive_data(&self, record: Record) -> SecurityResult<Record> {
        if !self.config.encryption_enabled {
            return Ok(record);
        }

        let encryptor = self.encryptor().await?;
        let key_name = &self.config.default_key;

        let mut record = record;
        for (field, value) in record.iter_mut() {
            if !is_sensitive_field(field) {
                continue;
            }

            let plaintext = Zeroizing::new(serde_json::to_vec(&*value)?);
            let payload = encryptor.encrypt(&plaintext, key_name).await?;
            *value = Value::String(STANDARD.encode(payload));
            debug!(field = %field, "Encrypted sensitive field");
        }

        Ok(record)
    }

    /// Reverse [`encrypt_sensitive_data`](Self::encrypt_sensitive_data)
    pub async fn decrypt_sensitive_data(&self, record: Record) -> SecurityResult<Record> {
        if !self.config.encryption_enabled {
            return Ok(record);
        }

        let encryptor = self.encryptor().await?;
        let key_name = &self.config.default_key;

        let mut record = record;
        for (field, value) in record.iter_mut() {
            if !is_sensitive_field(field) {
                continue;
            }

            let encoded = value.as_str().ok_or_else(|| {
                SecurityError::InvalidEncoding(format!("field {} is not an encrypted string", field))
            })?;
            let payload = STANDARD
                .decode(encoded)
                .map_err(|e| SecurityError::InvalidEncoding(format!("field {}: {}", field, e)))?;
            let plaintext = Zeroizing::new(encryptor.decrypt(&payload, key_name).await?);
            *value = serde_json::from_slice(&plaintext)?;
        }

        Ok(record)
    }

    /// Record a security-relevant action in the audit trail
    pub async fn log_security_event(
        &self,
        event_type: &str,
        user: &str,
        resource: &str,
        action: &str,
        result: &str,
        details: Map<String, Value>,
    ) -> SecurityResult<()> {
        let event = AuditEvent::new(event_type, user, resource, action, result).with_details(details);
        self.record_event(event).await
    }

    /// Record a caller-built event; severity is always set by policy
    pub async fn record_event(&self, mut event: AuditEvent) -> SecurityResult<()> {
        event.severity = classify_severity(&event.event_type, &event.result);
        self.audit.log_event(event).await?;
        Ok(())
    }

    /// Generate (or replace) the key `name` and audit the action.
    ///
    /// Returns the new key's fingerprint; the key itself never leaves the store.
    pub async fn generate_key(&self, name: &str, user: &str) -> SecurityResult<String> {
        let encryptor = self.encryptor().await?;

        match encryptor.key_manager().generate_key(name).await {
            Ok(key) => {
                let fingerprint = key.fingerprint();
                let event = AuditEvent::new("key_management", user, name, "generate", "success")
                    .with_detail("fingerprint", fingerprint.clone());
                self.record_event(event).await?;
                Ok(fingerprint)
            }
            Err(e) => {
                let event = AuditEvent::new("key_management", user, name, "generate", "failure")
                    .with_detail("error", e.to_string());
                if let Err(audit_error) = self.record_event(event).await {
                    warn!(error = %audit_error, "Failed to audit key generation failure");
                }
                Err(e.into())
            }
        }
    }

    /// Stored keys, sorted by name
    pub async fn list_keys(&self) -> SecurityResult<Vec<KeyInfo>> {
        let keys = self.encryptor().await?.key_manager();

        let mut infos = Vec::new();
        for name in keys.list_keys().await {
            let fingerprint = keys.with_key(&name, |key| key.fingerprint()).await?;
            infos.push(KeyInfo { name, fingerprint });
        }
        Ok(infos)
    }
}
