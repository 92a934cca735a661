//! Local key store: named 256-bit keys persisted as a JSON file
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


use crate::error::{KeyError, KeyResult};
use crate::key_types::{Key, KeyName};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// Durable, in-memory cached store of named symmetric keys.
///
/// The store file is a JSON object mapping key name to the base64 encoding
/// of the raw key bytes. Keys are NOT wrapped under a master key: anyone who
/// can read the file can read the keys, so it is written owner-only.
pub struct KeyManager {
    /// Path of the key store file
    store_path: PathBuf,
    /// Name seeded into an absent store
    default_key: KeyName,
    /// In-memory key table
    keys: RwLock<HashMap<KeyName, Key>>,
}

impl KeyManager {
    /// Open the key store at `store_path`, loading existing keys.
    ///
    /// If the file does not exist yet, or has no usable key named
    /// `default_key`, that key is generated and persisted.
    pub async fn open<P: AsRef<Path>>(
        store_path: P,
        default_key: impl Into<KeyName>,
    ) -> KeyResult<Self> {
        let manager = Self {
            store_path: store_path.as_ref().to_path_buf(),
            default_key: default_key.into(),
            keys: RwLock::new(HashMap::new()),
        };

        manager.load_keys().await?;

        Ok(manager)
    }

    /// Path of the backing key store file
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Name of the key seeded on first use
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// (Re)load the key table from disk.
    ///
    /// Entries that are not valid base64 or not 32 bytes long are skipped.
    /// If the store is missing, or holds no usable `default_key`, a fresh
    /// default key is generated and persisted.
    pub async fn load_keys(&self) -> KeyResult<()> {
        let mut keys = self.keys.write().await;
        keys.clear();

        match fs::read(&self.store_path).await {
            Ok(content) => {
                let encoded: HashMap<String, String> =
                    serde_json::from_slice(&content).map_err(|e| {
                        KeyError::StoreRead(format!("{}: {}", self.store_path.display(), e))
                    })?;

                for (name, value) in encoded {
                    match decode_key(&value) {
                        Ok(key) => {
                            keys.insert(name, key);
                        }
                        Err(e) => {
                            warn!(key = %name, error = %e, "Skipping unreadable key store entry");
                        }
                    }
                }

                debug!(count = keys.len(), path = %self.store_path.display(), "Loaded keys");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.store_path.display(), "Key store not found");
            }
            Err(e) => {
                return Err(KeyError::StoreRead(format!(
                    "{}: {}",
                    self.store_path.display(),
                    e
                )));
            }
        }

        if !keys.contains_key(&self.default_key) {
            info!(key = %self.default_key, "Seeding default key");
            let key = Key::generate();
            let fingerprint = key.fingerprint();
            keys.insert(self.default_key.clone(), key);
            self.persist(&keys).await?;
            info!(key = %self.default_key, fingerprint = %fingerprint, "Generated key");
        }

        Ok(())
    }

    /// Generate a new random key under `name`, replacing any existing one,
    /// and persist the whole table.
    ///
    /// On a persistence failure the in-memory table still holds the new key
    /// but the error is returned; callers must not treat it as durable.
    pub async fn generate_key(&self, name: &str) -> KeyResult<Key> {
        let key = Key::generate();

        let mut keys = self.keys.write().await;
        let replaced = keys.insert(name.to_string(), key.clone()).is_some();
        self.persist(&keys).await?;

        info!(
            key = name,
            fingerprint = %key.fingerprint(),
            replaced,
            "Generated key"
        );
        Ok(key)
    }

    /// Get a copy of the key stored under `name`
    pub async fn get_key(&self, name: &str) -> KeyResult<Key> {
        let keys = self.keys.read().await;
        keys.get(name)
            .cloned()
            .ok_or_else(|| KeyError::NotFound(name.to_string()))
    }

    /// Run `f` with a borrow of the key under `name`, holding the read lock
    /// only for the duration of the call.
    pub async fn with_key<T>(&self, name: &str, f: impl FnOnce(&Key) -> T) -> KeyResult<T> {
        let keys = self.keys.read().await;
        let key = keys
            .get(name)
            .ok_or_else(|| KeyError::NotFound(name.to_string()))?;
        Ok(f(key))
    }

    /// List all key names, sorted
    pub async fn list_keys(&self) -> Vec<KeyName> {
        let keys = self.keys.read().await;
        let mut names: Vec<KeyName> = keys.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a key exists
    pub async fn key_exists(&self, name: &str) -> bool {
        self.keys.read().await.contains_key(name)
    }

    /// Write the table to disk. Called with the write lock held.
    async fn persist(&self, keys: &HashMap<KeyName, Key>) -> KeyResult<()> {
        let encoded: BTreeMap<&str, String> = keys
            .iter()
            .map(|(name, key)| (name.as_str(), STANDARD.encode(key.as_bytes())))
            .collect();
        let json = Zeroizing::new(
            serde_json::to_vec_pretty(&encoded).map_err(|e| KeyError::StoreWrite(e.to_string()))?,
        );

        let write_error =
            |e: std::io::Error| KeyError::StoreWrite(format!("{}: {}", self.store_path.display(), e));

        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_private_dir(parent).await.map_err(write_error)?;
            }
        }

        // Write a sibling file and rename it over the store so a failed
        // write never leaves a truncated store behind.
        let tmp_path = temp_path(&self.store_path);
        write_private_file(&tmp_path, &json).await.map_err(write_error)?;
        fs::rename(&tmp_path, &self.store_path)
            .await
            .map_err(write_error)?;

        debug!(count = keys.len(), path = %self.store_path.display(), "Persisted key store");
        Ok(())
    }
}

/// `keys.json` -> `keys.json.tmp`, next to the store
fn temp_path(store_path: &Path) -> PathBuf {
    let mut name = store_path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    store_path.with_file_name(name)
}

fn decode_key(value: &str) -> KeyResult<Key> {
    let bytes = Zeroizing::new(
        STANDARD
            .decode(value.trim())
            .map_err(|e| KeyError::InvalidFormat(format!("Invalid base64: {}", e)))?,
    );
    Key::from_bytes(&bytes)
}

async fn create_private_dir(path: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(path).await
}

async fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }

    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_path_appends_suffix() {
        assert_eq!(
            temp_path(Path::new("/var/lib/skyward/keys.json")),
            PathBuf::from("/var/lib/skyward/keys.json.tmp")
        );
        // A store already ending in .tmp must not map onto itself
        assert_eq!(
            temp_path(Path::new("keys.tmp")),
            PathBuf::from("keys.tmp.tmp")
        );
    }
}
