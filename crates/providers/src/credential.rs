//! Credential encryption at rest.
//!
//! Provider API keys are AEAD-encrypted with a 256-bit key derived from the
//! process-wide `MODEL_PROVIDER_SECRET`. Ciphertext is stored as
//! `nonce(12 bytes) || aes_gcm_ciphertext`; decryption fails closed if the
//! nonce is missing or the tag doesn't verify.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::Error;

const NONCE_LEN: usize = 12;

/// Derives a 256-bit AES key from an arbitrary-length secret via SHA-256,
/// so operators can set `MODEL_PROVIDER_SECRET` to any passphrase length.
fn derive_key(secret: &str) -> Key<Aes256Gcm> {
    let digest = Sha256::digest(secret.as_bytes());
    *Key::<Aes256Gcm>::from_slice(&digest)
}

pub fn encrypt(plaintext: &SecretString, secret: &str) -> Result<Vec<u8>, Error> {
    let cipher = Aes256Gcm::new(&derive_key(secret));
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.expose_secret().as_bytes())
        .map_err(|err| Error::CredentialDecryption(err.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(nonce.as_slice());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

pub fn decrypt(stored: &[u8], secret: &str) -> Result<SecretString, Error> {
    if stored.len() <= NONCE_LEN {
        return Err(Error::CredentialDecryption("ciphertext shorter than nonce".to_string()));
    }

    let (nonce_bytes, ciphertext) = stored.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new(&derive_key(secret));
    let plaintext =
        cipher.decrypt(nonce, ciphertext).map_err(|err| Error::CredentialDecryption(err.to_string()))?;

    String::from_utf8(plaintext)
        .map(SecretString::from)
        .map_err(|err| Error::CredentialDecryption(err.to_string()))
}

/// Last 4 characters of the plaintext credential, the only credential-adjacent
/// data exposed in API responses.
pub fn hint(plaintext: &SecretString) -> String {
    let raw = plaintext.expose_secret();
    let len = raw.chars().count();
    raw.chars().skip(len.saturating_sub(4)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encrypt_and_decrypt() {
        let secret = SecretString::from("sk-super-secret-key".to_string());
        let stored = encrypt(&secret, "process-wide-secret").unwrap();
        let recovered = decrypt(&stored, "process-wide-secret").unwrap();
        assert_eq!(recovered.expose_secret(), secret.expose_secret());
    }

    #[test]
    fn wrong_secret_fails_to_decrypt() {
        let secret = SecretString::from("sk-super-secret-key".to_string());
        let stored = encrypt(&secret, "process-wide-secret").unwrap();
        assert!(decrypt(&stored, "different-secret").is_err());
    }

    #[test]
    fn hint_is_last_four_characters() {
        let secret = SecretString::from("sk-abcdwxyz".to_string());
        assert_eq!(hint(&secret), "wxyz");
    }
}
