use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;

const NONCE_LEN: usize = 12;

/// AES-256-GCM sealing for identity photos at rest.
///
/// Every blob is bound to the storage key it is written under (used as
/// associated data), so a ciphertext copied to another key will not open.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Create from a base64-encoded 32-byte key.
    pub fn new(key_base64: &str) -> Result<Self, EncryptionError> {
        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(key_base64)
            .map_err(|_| EncryptionError::InvalidKey)?;

        if key_bytes.len() != 32 {
            return Err(EncryptionError::InvalidKey);
        }

        let cipher =
            Aes256Gcm::new_from_slice(&key_bytes).map_err(|_| EncryptionError::InvalidKey)?;

        Ok(Self { cipher })
    }

    /// Seal `plaintext` for `object_key`. Output is nonce || ciphertext.
    pub fn seal(&self, object_key: &str, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext,
                    aad: object_key.as_bytes(),
                },
            )
            .map_err(|_| EncryptionError::EncryptFailed)?;

        let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend(ciphertext);
        Ok(output)
    }

    /// Open a blob produced by [`seal`](Self::seal) under the same key.
    pub fn open(&self, object_key: &str, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        if data.len() < NONCE_LEN {
            return Err(EncryptionError::DecryptFailed);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad: object_key.as_bytes(),
                },
            )
            .map_err(|_| EncryptionError::DecryptFailed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Invalid encryption key (must be 32 bytes, base64-encoded)")]
    InvalidKey,

    #[error("Encryption failed")]
    EncryptFailed,

    #[error("Decryption failed")]
    DecryptFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EncryptionService {
        let key = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        EncryptionService::new(&key).unwrap()
    }

    #[test]
    fn test_seal_and_open() {
        let svc = service();
        let sealed = svc.seal("verifications/a/id_card.enc", b"photo bytes").unwrap();

        assert_ne!(&sealed[NONCE_LEN..], b"photo bytes");
        assert_eq!(
            svc.open("verifications/a/id_card.enc", &sealed).unwrap(),
            b"photo bytes"
        );
    }

    #[test]
    fn test_open_under_other_key_fails() {
        let svc = service();
        let sealed = svc.seal("verifications/a/id_card.enc", b"photo bytes").unwrap();

        assert!(matches!(
            svc.open("verifications/a/selfie.enc", &sealed),
            Err(EncryptionError::DecryptFailed)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let svc = service();
        let mut sealed = svc.seal("k", b"photo bytes").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;

        assert!(svc.open("k", &sealed).is_err());
        assert!(svc.open("k", &sealed[..4]).is_err());
    }

    #[test]
    fn test_rejects_short_key() {
        let key = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        assert!(matches!(
            EncryptionService::new(&key),
            Err(EncryptionError::InvalidKey)
        ));
        assert!(EncryptionService::new("not base64!").is_err());
    }
}
