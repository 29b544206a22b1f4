//! Structural and cryptographic checks on a binding redeemer

use crate::binding::cose::split_sig_structure;
use crate::binding::redeemer::BindingRedeemer;
use crate::config::BindingConfig;
use crate::core::diger::{blake2b_224, BLAKE2B_224_SIZE};
use crate::core::verfer::verify_ed25519;
use crate::error::{BindingError, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Size of a Cardano payment key hash
pub const KEY_HASH_SIZE: usize = BLAKE2B_224_SIZE;

/// Fixed byte lengths, checked in this order
pub const FIELD_LENGTHS: [(&str, usize); 4] = [
    ("cardano_public_key", 32),
    ("cardano_signature", 64),
    ("veridian_signature", 64),
    ("holder_public_key", 32),
];

/// Outcome of checking both signatures of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignatureVerification {
    pub cardano_valid: bool,
    pub veridian_valid: bool,
}

impl SignatureVerification {
    /// Both signatures verified
    pub fn is_sound(&self) -> bool {
        self.cardano_valid && self.veridian_valid
    }

    /// Turn a partial result into an error naming the failed signature(s)
    pub fn require_sound(&self) -> Result<()> {
        if self.is_sound() {
            return Ok(());
        }
        warn!(
            cardano_valid = self.cardano_valid,
            veridian_valid = self.veridian_valid,
            "binding signature verification failed"
        );
        Err(BindingError::SignatureInvalid {
            cardano: self.cardano_valid,
            veridian: self.veridian_valid,
        })
    }
}

/// Stateless validator for binding redeemers
pub struct BindingValidator;

impl BindingValidator {
    /// Check the fixed size byte fields, failing on the first mismatch
    pub fn validate_lengths(redeemer: &BindingRedeemer) -> Result<()> {
        for (field, expected) in FIELD_LENGTHS {
            let value = match field {
                "cardano_public_key" => redeemer.cardano_public_key(),
                "cardano_signature" => redeemer.cardano_signature(),
                "veridian_signature" => redeemer.veridian_signature(),
                _ => redeemer.holder_public_key(),
            };
            let actual = decode_field(field, value)?.len();
            if actual != expected {
                debug!(field, expected, actual, "redeemer field length mismatch");
                return Err(BindingError::FieldLengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Verify the Cardano signature over `sig_structure` and the KERI
    /// signature over the canonical message
    ///
    /// The Cardano side also fails when the Sig_structure payload is not
    /// `cose_payload`. Malformed field encodings are errors; signatures that
    /// do not verify are reported in the result.
    pub fn verify_signatures(
        redeemer: &BindingRedeemer,
        cose_payload: &[u8],
        cardano_pub_key: &[u8],
        holder_pub_key: &[u8],
    ) -> Result<SignatureVerification> {
        let sig_structure = decode_field("sig_structure", redeemer.sig_structure())?;
        let cardano_sig = decode_field("cardano_signature", redeemer.cardano_signature())?;
        let veridian_sig = decode_field("veridian_signature", redeemer.veridian_signature())?;
        let canonical = decode_field("canonical_message", redeemer.canonical_message())?;

        let (_, signed_payload) = split_sig_structure(&sig_structure)?;
        let cardano_valid = if signed_payload != cose_payload {
            warn!("Sig_structure payload differs from the expected COSE payload");
            false
        } else {
            verify_or_reject("cardano", cardano_pub_key, &cardano_sig, &sig_structure)?
        };

        let veridian_valid = verify_or_reject("veridian", holder_pub_key, &veridian_sig, &canonical)?;

        debug!(cardano_valid, veridian_valid, "verified binding signatures");
        Ok(SignatureVerification {
            cardano_valid,
            veridian_valid,
        })
    }

    /// Check that the Cardano wallet signed the canonical message
    ///
    /// CIP-8 wallets sign either the message itself or, with `hashed` set,
    /// its blake2b-224 hash. `hashed: None` accepts either form.
    pub fn require_canonical_payload(
        cose_payload: &[u8],
        canonical_message: &[u8],
        hashed: Option<bool>,
    ) -> Result<()> {
        let plain = cose_payload == canonical_message;
        let digest = cose_payload == blake2b_224(canonical_message).as_slice();
        let matches = match hashed {
            Some(true) => digest,
            Some(false) => plain,
            None => plain || digest,
        };
        if matches {
            return Ok(());
        }
        warn!(?hashed, "COSE payload is not the canonical message");
        Err(BindingError::PayloadMismatch(format!(
            "expected {}",
            String::from_utf8_lossy(canonical_message)
        )))
    }

    /// blake2b-224 of a raw Cardano public key
    pub fn cardano_key_hash(public_key: &[u8]) -> Result<[u8; KEY_HASH_SIZE]> {
        let key: &[u8; 32] = public_key
            .try_into()
            .map_err(|_| BindingError::InvalidKeyLength {
                expected: 32,
                actual: public_key.len(),
            })?;
        Ok(blake2b_224(key))
    }

    /// Whether the bound Cardano key is among the transaction's required signers
    ///
    /// Non-membership is an ordinary policy outcome and returns `false`.
    pub fn check_signer_binding<I, S>(cardano_public_key: &[u8; 32], transaction_signers: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let hash = blake2b_224(cardano_public_key);
        let found = transaction_signers
            .into_iter()
            .any(|signer| signer.as_ref() == hash.as_slice());
        if !found {
            warn!(key_hash = %hex::encode(hash), "bound Cardano key did not sign the transaction");
        }
        found
    }

    /// Error form of [`BindingValidator::check_signer_binding`]
    ///
    /// A key that is not 32 bytes is `InvalidKeyLength`, never a mismatch.
    pub fn require_signer_binding<I, S>(cardano_public_key: &[u8], transaction_signers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let hash = Self::cardano_key_hash(cardano_public_key)?;
        if transaction_signers
            .into_iter()
            .any(|signer| signer.as_ref() == hash.as_slice())
        {
            return Ok(());
        }
        warn!(key_hash = %hex::encode(hash), "bound Cardano key did not sign the transaction");
        Err(BindingError::SignerMismatch(hex::encode(hash)))
    }

    /// Full acceptance policy for a received redeemer
    ///
    /// Lengths, that `cose_payload` is the redeemer's canonical message (plain
    /// or hashed), both signatures, and (when the config asks for it) the
    /// replay guard. `holder_pub_key` overrides the key carried in the
    /// redeemer, e.g. with the current key from a KEL key state.
    pub fn verify_binding<I, S>(
        redeemer: &BindingRedeemer,
        cose_payload: &[u8],
        holder_pub_key: Option<&[u8]>,
        transaction_signers: I,
        config: &BindingConfig,
    ) -> Result<SignatureVerification>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        Self::validate_lengths(redeemer)?;
        let canonical = redeemer.canonical_message_text()?;
        Self::require_canonical_payload(cose_payload, canonical.as_bytes(), None)?;

        let cardano_key = decode_field("cardano_public_key", redeemer.cardano_public_key())?;
        let redeemer_holder_key = decode_field("holder_public_key", redeemer.holder_public_key())?;
        let holder_key = holder_pub_key.unwrap_or(&redeemer_holder_key);

        let report = Self::verify_signatures(redeemer, cose_payload, &cardano_key, holder_key)?;
        report.require_sound()?;

        if config.require_signer_binding {
            Self::require_signer_binding(&cardano_key, transaction_signers)?;
        }
        Ok(report)
    }
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value)
        .map_err(|e| BindingError::MalformedEncoding(format!("{} is not hex: {}", field, e)))
}

/// A key that is not a valid curve point cannot have produced the signature
fn verify_or_reject(which: &str, key: &[u8], sig: &[u8], msg: &[u8]) -> Result<bool> {
    match verify_ed25519(key, sig, msg) {
        Ok(valid) => Ok(valid),
        Err(BindingError::CryptoError(e)) => {
            warn!(signature = which, error = %e, "public key is not a valid Ed25519 point");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
