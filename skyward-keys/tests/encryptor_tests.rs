//! AES-256-GCM encryptor tests

use skyward_keys::{Encryptor, KeyError, KeyManager, NONCE_SIZE, TAG_SIZE};
use std::sync::Arc;
use tempfile::TempDir;

async fn encryptor(dir: &TempDir) -> Encryptor {
    let keys = KeyManager::open(dir.path().join("keys.json"), "default")
        .await
        .unwrap();
    Encryptor::new(Arc::new(keys))
}

#[tokio::test]
async fn test_round_trip() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;

    let large = vec![0u8; 4096];
    let inputs: [&[u8]; 4] = [b"", b"x", b"hello world", &large];
    for plaintext in inputs {
        let payload = encryptor.encrypt(plaintext, "default").await.unwrap();
        assert_eq!(payload.len(), NONCE_SIZE + plaintext.len() + TAG_SIZE);
        let decrypted = encryptor.decrypt(&payload, "default").await.unwrap();
        assert_eq!(decrypted, plaintext);
    }
}

#[tokio::test]
async fn test_encryption_is_non_deterministic() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;

    let a = encryptor.encrypt(b"same input", "default").await.unwrap();
    let b = encryptor.encrypt(b"same input", "default").await.unwrap();

    assert_ne!(a, b);
    assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
}

#[tokio::test]
async fn test_any_bit_flip_fails_authentication() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;
    let payload = encryptor.encrypt(b"hello", "default").await.unwrap();

    for byte in 0..payload.len() {
        for bit in 0..8 {
            let mut tampered = payload.clone();
            tampered[byte] ^= 1 << bit;
            let result = encryptor.decrypt(&tampered, "default").await;
            assert!(
                matches!(result, Err(KeyError::Authentication)),
                "byte {} bit {} was not rejected",
                byte,
                bit
            );
        }
    }
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;
    encryptor.key_manager().generate_key("a").await.unwrap();
    encryptor.key_manager().generate_key("b").await.unwrap();

    let payload = encryptor.encrypt(b"secret", "a").await.unwrap();
    let result = encryptor.decrypt(&payload, "b").await;

    assert!(matches!(result, Err(KeyError::Authentication)));
}

#[tokio::test]
async fn test_short_payload_is_invalid_ciphertext() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;

    let result = encryptor.decrypt(&[0u8; NONCE_SIZE - 1], "default").await;
    assert!(matches!(result, Err(KeyError::InvalidCiphertext(_))));
}

#[tokio::test]
async fn test_missing_key_is_not_found() {
    let dir = TempDir::new().unwrap();
    let encryptor = encryptor(&dir).await;

    assert!(matches!(
        encryptor.encrypt(b"data", "ghost").await,
        Err(KeyError::NotFound(_))
    ));
    assert!(matches!(
        encryptor.decrypt(&[0u8; 64], "ghost").await,
        Err(KeyError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_payload_survives_key_store_restart() {
    let dir = TempDir::new().unwrap();
    let payload = {
        let encryptor = encryptor(&dir).await;
        encryptor.encrypt(b"persisted", "default").await.unwrap()
    };

    let reopened = encryptor(&dir).await;
    assert_eq!(
        reopened.decrypt(&payload, "default").await.unwrap(),
        b"persisted"
    );
}
