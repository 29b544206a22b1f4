//! Binding redeemer: the 13 field structure handed to the on-chain verifier
//!
//! The verifier reads fields by position, so the order below is fixed.
//! Text fields are carried as hex of their UTF-8 bytes, byte fields as hex.

use crate::binding::cesr::{ParsedCesrSignature, ParsedKeriAid};
use crate::binding::cose::ParsedCoseSignature;
use crate::binding::message::BindingMessage;
use crate::binding::validator::BindingValidator;
use crate::error::{BindingError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Field names in positional order
pub const REDEEMER_FIELDS: [&str; 13] = [
    "binding_said",
    "issuer_aid",
    "holder_aid",
    "cardano_address",
    "cardano_public_key",
    "sig_structure",
    "cardano_signature",
    "canonical_message",
    "veridian_signature",
    "holder_public_key",
    "keri_version",
    "binding_type",
    "created_at",
];

/// A single positional redeemer value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemerField {
    /// Lowercase hex
    Bytes(String),
    Int(i64),
}

impl RedeemerField {
    /// Plutus data JSON form
    pub fn to_plutus_json(&self) -> Value {
        match self {
            RedeemerField::Bytes(hex) => json!({ "bytes": hex }),
            RedeemerField::Int(n) => json!({ "int": n }),
        }
    }
}

/// Dual signature proof linking a Cardano key to a KERI AID
///
/// Built by [`BindingRedeemer::assemble`]; a redeemer received from
/// elsewhere can be deserialized and must then pass
/// [`BindingValidator::validate_lengths`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRedeemer {
    pub(crate) binding_said: String,
    pub(crate) issuer_aid: String,
    pub(crate) holder_aid: String,
    pub(crate) cardano_address: String,
    pub(crate) cardano_public_key: String,
    pub(crate) sig_structure: String,
    pub(crate) cardano_signature: String,
    pub(crate) canonical_message: String,
    pub(crate) veridian_signature: String,
    pub(crate) holder_public_key: String,
    pub(crate) keri_version: String,
    pub(crate) binding_type: String,
    pub(crate) created_at: i64,
}

fn text_hex(text: &str) -> String {
    hex::encode(text.as_bytes())
}

impl BindingRedeemer {
    /// Pack a binding message and its parsed proofs
    ///
    /// The Cardano key is the explicit 32 byte key from the message when
    /// present, otherwise the key from the COSE_Key. The COSE payload must be
    /// the canonical message, or its blake2b-224 hash when `hashed` is set.
    pub fn assemble(
        msg: &BindingMessage,
        cose: &ParsedCoseSignature,
        cesr_sig: &ParsedCesrSignature,
        cesr_key: &ParsedKeriAid,
    ) -> Result<Self> {
        BindingValidator::require_canonical_payload(
            cose.payload(),
            msg.canonical_message().as_bytes(),
            Some(cose.hashed()),
        )?;

        let cardano_public_key = match msg.explicit_public_key() {
            Some(key) => key,
            None => *cose.public_key().ok_or(BindingError::MissingPublicKey)?,
        };

        let redeemer = Self {
            binding_said: text_hex(&msg.said()?),
            issuer_aid: text_hex(msg.issuer_aid()),
            holder_aid: text_hex(msg.holder_aid()),
            cardano_address: text_hex(msg.cardano_address()),
            cardano_public_key: hex::encode(cardano_public_key),
            sig_structure: hex::encode(cose.sig_structure()),
            cardano_signature: hex::encode(cose.signature()),
            canonical_message: text_hex(msg.canonical_message()),
            veridian_signature: cesr_sig.signature_hex(),
            holder_public_key: cesr_key.public_key_hex(),
            keri_version: text_hex(msg.keri_version()),
            binding_type: text_hex(msg.message_type()),
            created_at: msg.created_at(),
        };

        BindingValidator::validate_lengths(&redeemer)?;
        debug!(
            holder = %msg.holder_aid(),
            created_at = msg.created_at(),
            "assembled binding redeemer"
        );
        Ok(redeemer)
    }

    /// Parse every wallet output carried by the message, then assemble
    pub fn from_message(msg: &BindingMessage) -> Result<Self> {
        let cose = ParsedCoseSignature::parse(msg.cardano_signature_raw(), msg.cose_key_hex())?;
        let cesr_sig = ParsedCesrSignature::parse(msg.keri_signature_raw())?;
        let cesr_key = ParsedKeriAid::parse(msg.holder_aid())?;
        Self::assemble(msg, &cose, &cesr_sig, &cesr_key)
    }

    /// The 13 values in on-chain order
    pub fn fields(&self) -> [(&'static str, RedeemerField); 13] {
        let b = |s: &String| RedeemerField::Bytes(s.clone());
        [
            (REDEEMER_FIELDS[0], b(&self.binding_said)),
            (REDEEMER_FIELDS[1], b(&self.issuer_aid)),
            (REDEEMER_FIELDS[2], b(&self.holder_aid)),
            (REDEEMER_FIELDS[3], b(&self.cardano_address)),
            (REDEEMER_FIELDS[4], b(&self.cardano_public_key)),
            (REDEEMER_FIELDS[5], b(&self.sig_structure)),
            (REDEEMER_FIELDS[6], b(&self.cardano_signature)),
            (REDEEMER_FIELDS[7], b(&self.canonical_message)),
            (REDEEMER_FIELDS[8], b(&self.veridian_signature)),
            (REDEEMER_FIELDS[9], b(&self.holder_public_key)),
            (REDEEMER_FIELDS[10], b(&self.keri_version)),
            (REDEEMER_FIELDS[11], b(&self.binding_type)),
            (REDEEMER_FIELDS[12], RedeemerField::Int(self.created_at)),
        ]
    }

    /// Constructor 0 Plutus data JSON
    pub fn to_plutus_json(&self) -> Value {
        let fields: Vec<Value> = self
            .fields()
            .iter()
            .map(|(_, field)| field.to_plutus_json())
            .collect();
        json!({ "constructor": 0, "fields": fields })
    }

    pub fn binding_said(&self) -> &str {
        &self.binding_said
    }

    pub fn issuer_aid(&self) -> &str {
        &self.issuer_aid
    }

    pub fn holder_aid(&self) -> &str {
        &self.holder_aid
    }

    pub fn cardano_address(&self) -> &str {
        &self.cardano_address
    }

    pub fn cardano_public_key(&self) -> &str {
        &self.cardano_public_key
    }

    pub fn sig_structure(&self) -> &str {
        &self.sig_structure
    }

    pub fn cardano_signature(&self) -> &str {
        &self.cardano_signature
    }

    pub fn canonical_message(&self) -> &str {
        &self.canonical_message
    }

    pub fn veridian_signature(&self) -> &str {
        &self.veridian_signature
    }

    pub fn holder_public_key(&self) -> &str {
        &self.holder_public_key
    }

    pub fn keri_version(&self) -> &str {
        &self.keri_version
    }

    pub fn binding_type(&self) -> &str {
        &self.binding_type
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Canonical message decoded back to text
    pub fn canonical_message_text(&self) -> Result<String> {
        let bytes = hex::decode(&self.canonical_message)?;
        String::from_utf8(bytes).map_err(|e| {
            BindingError::MalformedEncoding(format!("canonical_message is not UTF-8: {}", e))
        })
    }
}
