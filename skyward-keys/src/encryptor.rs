//! Authenticated encryption (AES-256-GCM) over named keys
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
use crate::key_manager::KeyManager;
use crate::key_types::Key;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use std::sync::Arc;

/// Size of the AES-GCM nonce prefixed to every payload
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Encrypts and decrypts payloads under keys held by a [`KeyManager`].
///
/// Payload layout is `nonce || ciphertext || tag`. Nonces are always drawn
/// here; no caller can supply one.
#[derive(Clone)]
pub struct Encryptor {
    keys: Arc<KeyManager>,
}

impl Encryptor {
    pub fn new(keys: Arc<KeyManager>) -> Self {
        Self { keys }
    }

    pub fn key_manager(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Seal `plaintext` under the key named `key_name`
    pub async fn encrypt(&self, plaintext: &[u8], key_name: &str) -> KeyResult<Vec<u8>> {
        self.keys
            .with_key(key_name, |key| seal(key, plaintext))
            .await?
    }

    /// Open a payload produced by [`Encryptor::encrypt`]
    pub async fn decrypt(&self, payload: &[u8], key_name: &str) -> KeyResult<Vec<u8>> {
        self.keys
            .with_key(key_name, |key| open(key, payload))
            .await?
    }
}

fn cipher_for(key: &Key) -> KeyResult<Aes256Gcm> {
    Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| KeyError::Encryption(e.to_string()))
}

fn seal(key: &Key, plaintext: &[u8]) -> KeyResult<Vec<u8>> {
    let cipher = cipher_for(key)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| KeyError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(payload)
}

fn open(key: &Key, payload: &[u8]) -> KeyResult<Vec<u8>> {
    if payload.len() < NONCE_SIZE {
        return Err(KeyError::InvalidCiphertext(format!(
            "payload is {} bytes, shorter than the {} byte nonce",
            payload.len(),
            NONCE_SIZE
        )));
    }

    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);
    let cipher = cipher_for(key)?;

    cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| KeyError::Authentication)
}
