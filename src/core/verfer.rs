use crate::core::{matter_codes, Matter};
/// Verfer - Ed25519 signature verification with CESR encoding
use crate::error::{BindingError, Result};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verfer wraps a Matter containing an Ed25519 public key
#[derive(Debug, Clone)]
pub struct Verfer {
    matter: Matter,
}

impl Verfer {
    /// Create Verfer from raw public key bytes
    pub fn from_raw(raw: &[u8], code: &str) -> Result<Self> {
        // Validate code is a valid verifier code
        if !Self::is_valid_code(code) {
            return Err(BindingError::InvalidCode(format!(
                "Unsupported verifier code: {}",
                code
            )));
        }

        let matter = Matter::from_raw(raw, code)?;
        Ok(Self { matter })
    }

    /// Create Verfer from qb64
    pub fn from_qb64(qb64: &str) -> Result<Self> {
        let matter = Matter::from_qb64(qb64)?;

        if !Self::is_valid_code(matter.code()) {
            return Err(BindingError::InvalidCode(format!(
                "Unsupported verifier code: {}",
                matter.code()
            )));
        }

        Ok(Self { matter })
    }

    /// Check if code is valid for a verifier
    fn is_valid_code(code: &str) -> bool {
        matches!(code, matter_codes::ED25519 | matter_codes::ED25519N)
    }

    pub fn raw(&self) -> &[u8] {
        self.matter.raw()
    }

    pub fn qb64(&self) -> &str {
        self.matter.qb64()
    }
}

/// Ed25519 verification over raw key and signature bytes
pub fn verify_ed25519(public_key: &[u8], sig: &[u8], ser: &[u8]) -> Result<bool> {
    let key_bytes: &[u8; 32] = public_key
        .try_into()
        .map_err(|_| BindingError::InvalidKeyLength {
            expected: 32,
            actual: public_key.len(),
        })?;
    let sig_bytes: &[u8; 64] = sig
        .try_into()
        .map_err(|_| BindingError::InvalidSignatureLength {
            expected: 64,
            actual: sig.len(),
        })?;

    let verifying_key =
        VerifyingKey::from_bytes(key_bytes).map_err(|e| BindingError::CryptoError(e.to_string()))?;
    let signature = Signature::from_bytes(sig_bytes);

    match verifying_key.verify(ser, &signature) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}
