//! Key management for Skyward
//!
//! Named 256-bit keys persisted in a local key store, and AES-256-GCM
//! authenticated encryption addressed by key name.
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


pub mod encryptor;
pub mod error;
pub mod key_manager;
pub mod key_types;

pub use encryptor::{Encryptor, NONCE_SIZE, TAG_SIZE};
pub use error::{KeyError, KeyResult};
pub use key_manager::KeyManager;
pub use key_types::{Key, KeyName, KEY_SIZE};
