/// Cigar - Non-indexed signature
///
/// Wallet `sign` calls produce these; indexed signatures only appear inside
/// key event attachments and are refused here.
use crate::core::{matter_codes, Matter};
use crate::error::{BindingError, Result};

/// Non-indexed Ed25519 signature
#[derive(Debug, Clone)]
pub struct Cigar {
    matter: Matter,
}

impl Cigar {
    /// Create Cigar from qb64 string
    pub fn from_qb64(qb64: &str) -> Result<Self> {
        let matter = Matter::from_qb64(qb64)?;
        if matter.code() != matter_codes::ED25519_SIG {
            return Err(BindingError::InvalidCode(format!(
                "Not an Ed25519 signature code: {}",
                matter.code()
            )));
        }
        Ok(Self { matter })
    }

    pub fn code(&self) -> &str {
        self.matter.code()
    }

    /// Get raw signature bytes
    pub fn raw(&self) -> &[u8] {
        self.matter.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    #[test]
    fn test_cigar_from_wallet_signature() {
        let signing_key = SigningKey::from_bytes(&[3u8; 32]);
        let sig = signing_key.sign(b"roundtrip").to_bytes();
        let qb64 = Matter::from_raw(&sig, matter_codes::ED25519_SIG).unwrap();

        let cigar = Cigar::from_qb64(qb64.qb64()).unwrap();
        assert_eq!(cigar.code(), matter_codes::ED25519_SIG);
        assert_eq!(cigar.raw(), sig.as_slice());
    }

    #[test]
    fn test_cigar_rejects_key_code() {
        let key = Matter::from_raw(&[1u8; 32], matter_codes::ED25519).unwrap();
        assert!(matches!(
            Cigar::from_qb64(key.qb64()),
            Err(BindingError::InvalidCode(_))
        ));
    }
}
