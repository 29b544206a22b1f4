use crate::core::{matter_codes, Matter};
/// Diger - Cryptographic digests with CESR encoding
use crate::error::{BindingError, Result};
use blake2::digest::consts::U28;
use blake2::{Blake2b, Digest};

type Blake2b224 = Blake2b<U28>;

/// Size of a blake2b-224 digest
pub const BLAKE2B_224_SIZE: usize = 28;

/// Diger handles self-addressing digests with CESR encoding
#[derive(Debug, Clone)]
pub struct Diger {
    matter: Matter,
}

impl Diger {
    /// Create Diger by computing digest of serialization
    ///
    /// # Arguments
    /// * `code` - CESR code indicating hash algorithm ("E" for Blake3-256)
    /// * `ser` - Serialization bytes to hash
    pub fn new(code: &str, ser: &[u8]) -> Result<Self> {
        let digest = match code {
            matter_codes::BLAKE3_256 => blake3::hash(ser).as_bytes().to_vec(),
            _ => {
                return Err(BindingError::InvalidCode(format!(
                    "Unsupported digest code: {}",
                    code
                )))
            }
        };
        let matter = Matter::from_raw(&digest, code)?;
        Ok(Self { matter })
    }

    /// Get the underlying Matter representation
    pub fn matter(&self) -> &Matter {
        &self.matter
    }
}

/// blake2b-224, the hash Cardano uses for payment key hashes and hashed
/// CIP-8 payloads
pub fn blake2b_224(data: &[u8]) -> [u8; BLAKE2B_224_SIZE] {
    let digest = Blake2b224::digest(data);
    let mut out = [0u8; BLAKE2B_224_SIZE];
    out.copy_from_slice(&digest);
    out
}
