//! KERI wallet material: CESR signatures and AIDs
//!
//! Wallets hand us two strings. The signature is a non-indexed Ed25519
//! Cigar (`0B`, 88 chars); indexed Sigers from key event attachments are a
//! different encoding and are refused. The holder AID is read under the
//! binding convention `E` + `D` + base64url key.

use crate::core::{matter_codes, Cigar};
use crate::error::{BindingError, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use tracing::{debug, trace};

/// Total qb64 length of an Ed25519 non-indexed signature
pub const CESR_SIGNATURE_LEN: usize = 88;
pub const SIGNATURE_SIZE: usize = 64;
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Basic prefix character accepted for holder AIDs
pub const AID_PREFIX: char = 'E';
/// Ed25519 derivation code accepted for holder AIDs
pub const AID_DERIVATION_ED25519: char = 'D';

/// AID key bodies are 42 or 43 characters and need not end on a byte
/// boundary, so leftover bits are tolerated and padding is optional.
const AID_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Raw signature recovered from a KERI wallet signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCesrSignature {
    signature: [u8; SIGNATURE_SIZE],
    code: String,
    algorithm: &'static str,
}

impl ParsedCesrSignature {
    /// Decode an 88 character `0B` signature into its 64 raw bytes
    pub fn parse(cesr_signature: &str) -> Result<Self> {
        if cesr_signature.is_empty() {
            return Err(BindingError::InvalidArgument(
                "CESR signature is empty".to_string(),
            ));
        }

        if !cesr_signature.starts_with(matter_codes::ED25519_SIG) {
            let code: String = cesr_signature.chars().take(2).collect();
            debug!(code = %code, "rejecting CESR signature code");
            return Err(BindingError::UnsupportedSignatureCode(code));
        }

        if cesr_signature.len() != CESR_SIGNATURE_LEN {
            debug!(
                len = cesr_signature.len(),
                "rejecting CESR signature of wrong length"
            );
            return Err(BindingError::InvalidSize {
                expected: CESR_SIGNATURE_LEN,
                actual: cesr_signature.len(),
            });
        }

        let cigar = Cigar::from_qb64(cesr_signature).map_err(|e| match e {
            BindingError::InvalidSize { actual, .. } => BindingError::InvalidSignatureLength {
                expected: SIGNATURE_SIZE,
                actual,
            },
            BindingError::Base64Error(e) => {
                BindingError::MalformedEncoding(format!("CESR signature base64: {}", e))
            }
            BindingError::InvalidCesr(msg) => BindingError::MalformedEncoding(msg),
            other => other,
        })?;

        let signature: [u8; SIGNATURE_SIZE] =
            cigar
                .raw()
                .try_into()
                .map_err(|_| BindingError::InvalidSignatureLength {
                    expected: SIGNATURE_SIZE,
                    actual: cigar.raw().len(),
                })?;

        trace!("decoded CESR Ed25519 signature");
        Ok(Self {
            signature,
            code: cigar.code().to_string(),
            algorithm: "Ed25519",
        })
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    pub fn signature_hex(&self) -> String {
        hex::encode(self.signature)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn algorithm(&self) -> &'static str {
        self.algorithm
    }
}

/// Raw Ed25519 key recovered from a holder AID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeriAid {
    public_key: [u8; PUBLIC_KEY_SIZE],
    prefix_char: char,
    derivation_code: char,
}

impl ParsedKeriAid {
    /// Decode `E` + `D` + base64url into a 32 byte key
    ///
    /// A 42 character body decodes to 31 bytes; that key is left padded with
    /// a single zero byte. Any other decoded length is refused.
    pub fn parse(aid: &str) -> Result<Self> {
        let mut chars = aid.chars();
        let prefix_char = chars
            .next()
            .ok_or_else(|| BindingError::InvalidArgument("AID is empty".to_string()))?;
        if prefix_char != AID_PREFIX {
            return Err(BindingError::UnsupportedDerivationCode(format!(
                "AID prefix {} (expected {})",
                prefix_char, AID_PREFIX
            )));
        }

        let derivation_code = chars
            .next()
            .ok_or_else(|| BindingError::InvalidArgument("AID too short".to_string()))?;
        if derivation_code != AID_DERIVATION_ED25519 {
            return Err(BindingError::UnsupportedDerivationCode(format!(
                "AID derivation code {} (expected {})",
                derivation_code, AID_DERIVATION_ED25519
            )));
        }

        let body = chars.as_str();
        let decoded = AID_BASE64
            .decode(body)
            .map_err(|e| BindingError::MalformedEncoding(format!("AID base64: {}", e)))?;

        let public_key: [u8; PUBLIC_KEY_SIZE] = match decoded.len() {
            PUBLIC_KEY_SIZE => {
                let mut key = [0u8; PUBLIC_KEY_SIZE];
                key.copy_from_slice(&decoded);
                key
            }
            n if n == PUBLIC_KEY_SIZE - 1 => {
                let mut key = [0u8; PUBLIC_KEY_SIZE];
                key[1..].copy_from_slice(&decoded);
                key
            }
            n => {
                return Err(BindingError::InvalidKeyLength {
                    expected: PUBLIC_KEY_SIZE,
                    actual: n,
                })
            }
        };

        debug!(aid = %aid, "extracted holder public key from AID");
        Ok(Self {
            public_key,
            prefix_char,
            derivation_code,
        })
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key)
    }

    pub fn prefix_char(&self) -> char {
        self.prefix_char
    }

    pub fn derivation_code(&self) -> char {
        self.derivation_code
    }
}
