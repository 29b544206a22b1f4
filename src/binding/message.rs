//! Canonical binding statement and the binding request it belongs to

use crate::config::BindingConfig;
use crate::core::Saider;
use crate::error::{BindingError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const CANONICAL_TAG: &str = "BIND";
pub const CANONICAL_VERSION: &str = "v1";
pub const DELIMITER: char = '|';
/// Label of the SAID field in the hashed binding message
pub const SAID_LABEL: &str = "d";

/// Parsed form of `BIND|v1|<holderAID>|<cardanoAddress>|<unixMillis>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalMessage {
    holder_aid: String,
    cardano_address: String,
    timestamp_ms: i64,
}

impl CanonicalMessage {
    /// Format the statement both wallets sign
    ///
    /// AIDs and bech32 addresses never contain `|`; anything that does is
    /// refused instead of escaped.
    pub fn build(holder_aid: &str, cardano_address: &str, timestamp_ms: i64) -> Result<String> {
        check_component("holder AID", holder_aid)?;
        check_component("Cardano address", cardano_address)?;
        if timestamp_ms < 0 {
            return Err(BindingError::InvalidArgument(format!(
                "Timestamp must be non-negative, got {}",
                timestamp_ms
            )));
        }

        Ok(format!(
            "{tag}{d}{ver}{d}{aid}{d}{addr}{d}{ts}",
            tag = CANONICAL_TAG,
            ver = CANONICAL_VERSION,
            aid = holder_aid,
            addr = cardano_address,
            ts = timestamp_ms,
            d = DELIMITER,
        ))
    }

    /// Split a canonical message back into its components
    pub fn parse(message: &str) -> Result<Self> {
        let parts: Vec<&str> = message.split(DELIMITER).collect();
        if parts.len() != 5 {
            return Err(BindingError::MalformedEncoding(format!(
                "Canonical message must have 5 fields, got {}",
                parts.len()
            )));
        }
        if parts[0] != CANONICAL_TAG || parts[1] != CANONICAL_VERSION {
            return Err(BindingError::MalformedEncoding(format!(
                "Unexpected canonical message header {}|{}",
                parts[0], parts[1]
            )));
        }
        if parts[2].is_empty() || parts[3].is_empty() {
            return Err(BindingError::MalformedEncoding(
                "Canonical message has an empty AID or address".to_string(),
            ));
        }
        // Only the exact decimal form `build` writes
        let ts = parts[4];
        let canonical_digits = !ts.is_empty()
            && ts.bytes().all(|b| b.is_ascii_digit())
            && (ts == "0" || !ts.starts_with('0'));
        let timestamp_ms: i64 = canonical_digits
            .then(|| ts.parse().ok())
            .flatten()
            .ok_or_else(|| BindingError::MalformedEncoding(format!("Invalid timestamp: {}", ts)))?;

        Ok(Self {
            holder_aid: parts[2].to_string(),
            cardano_address: parts[3].to_string(),
            timestamp_ms,
        })
    }

    pub fn holder_aid(&self) -> &str {
        &self.holder_aid
    }

    pub fn cardano_address(&self) -> &str {
        &self.cardano_address
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }
}

fn check_component(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(BindingError::InvalidArgument(format!("{} is empty", name)));
    }
    if value.contains(DELIMITER) {
        return Err(BindingError::InvalidArgument(format!(
            "{} contains the '{}' delimiter",
            name, DELIMITER
        )));
    }
    Ok(())
}

/// Wallet outputs collected for one binding attempt
#[derive(Debug, Clone, Deserialize)]
pub struct BindingMessageArgs {
    /// Holder AID the KERI wallet signed with
    pub holder_aid: String,
    /// Bech32 Cardano address
    pub cardano_address: String,
    /// Hex raw 32 byte key, or hex COSE_Key from the wallet
    pub cardano_public_key_or_cose_key: String,
    /// Hex COSE_Sign1 from `signData`
    pub cardano_signature: String,
    /// CESR signature from the KERI wallet
    pub keri_signature: String,
    /// Unix milliseconds; now when omitted
    pub created_at: Option<i64>,
}

/// One binding attempt, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingMessage {
    keri_version: String,
    message_type: String,
    issuer_aid: String,
    holder_aid: String,
    cardano_address: String,
    cardano_public_key_or_cose_key: String,
    canonical_message: String,
    cardano_signature_raw: String,
    keri_signature_raw: String,
    created_at: i64,
}

impl BindingMessage {
    pub fn new(config: &BindingConfig, args: BindingMessageArgs) -> Result<Self> {
        if config.issuer_aid.is_empty() {
            return Err(BindingError::MissingField("issuer_aid".to_string()));
        }
        for (name, value) in [
            ("cardano_signature", &args.cardano_signature),
            ("keri_signature", &args.keri_signature),
        ] {
            if value.is_empty() {
                return Err(BindingError::MissingField(name.to_string()));
            }
        }

        let created_at = args
            .created_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
        let canonical_message =
            CanonicalMessage::build(&args.holder_aid, &args.cardano_address, created_at)?;

        debug!(holder = %args.holder_aid, created_at, "created binding message");
        Ok(Self {
            keri_version: config.keri_version.clone(),
            message_type: config.binding_type.clone(),
            issuer_aid: config.issuer_aid.clone(),
            holder_aid: args.holder_aid,
            cardano_address: args.cardano_address,
            cardano_public_key_or_cose_key: args.cardano_public_key_or_cose_key,
            canonical_message,
            cardano_signature_raw: args.cardano_signature,
            keri_signature_raw: args.keri_signature,
            created_at,
        })
    }

    pub fn keri_version(&self) -> &str {
        &self.keri_version
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
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

    pub fn cardano_public_key_or_cose_key(&self) -> &str {
        &self.cardano_public_key_or_cose_key
    }

    pub fn canonical_message(&self) -> &str {
        &self.canonical_message
    }

    pub fn cardano_signature_raw(&self) -> &str {
        &self.cardano_signature_raw
    }

    pub fn keri_signature_raw(&self) -> &str {
        &self.keri_signature_raw
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// The explicit 32 byte Cardano key, when that is what was supplied
    pub fn explicit_public_key(&self) -> Option<[u8; 32]> {
        hex::decode(&self.cardano_public_key_or_cose_key)
            .ok()
            .and_then(|raw| raw.as_slice().try_into().ok())
    }

    /// The COSE_Key hex, when the wallet supplied one instead of a raw key
    pub fn cose_key_hex(&self) -> Option<&str> {
        if self.cardano_public_key_or_cose_key.is_empty() || self.explicit_public_key().is_some()
        {
            None
        } else {
            Some(&self.cardano_public_key_or_cose_key)
        }
    }

    fn sad(&self) -> Result<Value> {
        let mut sad = serde_json::to_value(self)?;
        if let Some(obj) = sad.as_object_mut() {
            obj.insert(SAID_LABEL.to_string(), Value::String(String::new()));
        }
        Ok(sad)
    }

    /// Blake3-256 SAID over this message
    pub fn said(&self) -> Result<String> {
        Ok(Saider::derive(&self.sad()?, SAID_LABEL)?.qb64())
    }

    pub fn verify_said(&self, said: &str) -> Result<bool> {
        let saider = Saider::from_qb64(said)?;
        saider.verify(&self.sad()?, SAID_LABEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::testing::{CARDANO_ADDRESS, CREATED_AT, ISSUER_AID};

    const HOLDER: &str = "EDr7pprL3UJ_aoi3wz8wX4I75BUgpanhQdcBbTNb7UCV";

    fn args() -> BindingMessageArgs {
        BindingMessageArgs {
            holder_aid: HOLDER.to_string(),
            cardano_address: CARDANO_ADDRESS.to_string(),
            cardano_public_key_or_cose_key: "11".repeat(32),
            cardano_signature: "84".to_string(),
            keri_signature: "0B".to_string(),
            created_at: Some(CREATED_AT),
        }
    }

    #[test]
    fn test_build_canonical_message() {
        let msg = CanonicalMessage::build(HOLDER, "addr1xyz", 1_700_000_000_000).unwrap();
        assert_eq!(
            msg,
            "BIND|v1|EDr7pprL3UJ_aoi3wz8wX4I75BUgpanhQdcBbTNb7UCV|addr1xyz|1700000000000"
        );
    }

    #[test]
    fn test_canonical_roundtrip() {
        let cases = [
            (HOLDER, CARDANO_ADDRESS, 0i64),
            ("EDabc", "addr1q9", 1),
            (HOLDER, "addr_test1vz", i64::MAX),
        ];
        for (aid, addr, ts) in cases {
            let built = CanonicalMessage::build(aid, addr, ts).unwrap();
            let parsed = CanonicalMessage::parse(&built).unwrap();
            assert_eq!(parsed.holder_aid(), aid);
            assert_eq!(parsed.cardano_address(), addr);
            assert_eq!(parsed.timestamp_ms(), ts);
        }
    }

    #[test]
    fn test_build_rejects_bad_arguments() {
        for (aid, addr, ts) in [
            ("", "addr1", 1),
            (HOLDER, "", 1),
            ("ED|x", "addr1", 1),
            (HOLDER, "addr|1", 1),
            (HOLDER, "addr1", -1),
        ] {
            assert!(matches!(
                CanonicalMessage::build(aid, addr, ts),
                Err(BindingError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_parse_zero_timestamp() {
        let parsed = CanonicalMessage::parse("BIND|v1|aid|addr|0").unwrap();
        assert_eq!(parsed.timestamp_ms(), 0);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "BIND|v1|aid|addr",
            "BIND|v2|aid|addr|1",
            "BOUND|v1|aid|addr|1",
            "BIND|v1||addr|1",
            "BIND|v1|aid|addr|soon",
            "BIND|v1|aid|addr|+5",
            "BIND|v1|aid|addr|007",
            "BIND|v1|aid|addr|-1",
            "BIND|v1|aid|addr|99999999999999999999",
            "BIND|v1|aid|addr|1|extra",
        ] {
            assert!(
                matches!(
                    CanonicalMessage::parse(bad),
                    Err(BindingError::MalformedEncoding(_))
                ),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_binding_message_new() {
        let config = BindingConfig::new(ISSUER_AID);
        let msg = BindingMessage::new(&config, args()).unwrap();

        assert_eq!(msg.keri_version(), "1.0");
        assert_eq!(msg.message_type(), config.binding_type);
        assert_eq!(msg.issuer_aid(), ISSUER_AID);
        assert_eq!(msg.created_at(), CREATED_AT);
        assert_eq!(
            msg.canonical_message(),
            CanonicalMessage::build(HOLDER, CARDANO_ADDRESS, CREATED_AT).unwrap()
        );
        assert_eq!(msg.explicit_public_key(), Some([0x11; 32]));
        assert_eq!(msg.cose_key_hex(), None);
    }

    #[test]
    fn test_binding_message_defaults_timestamp() {
        let config = BindingConfig::new(ISSUER_AID);
        let mut a = args();
        a.created_at = None;
        let msg = BindingMessage::new(&config, a).unwrap();
        assert!(msg.created_at() > CREATED_AT);
    }

    #[test]
    fn test_binding_message_missing_signature() {
        let config = BindingConfig::new(ISSUER_AID);
        let mut a = args();
        a.keri_signature = String::new();
        assert!(matches!(
            BindingMessage::new(&config, a),
            Err(BindingError::MissingField(_))
        ));
    }

    #[test]
    fn test_cose_key_field() {
        let config = BindingConfig::new(ISSUER_AID);
        let mut a = args();
        a.cardano_public_key_or_cose_key = "a4010103272006215820".to_string() + &"11".repeat(32);
        let msg = BindingMessage::new(&config, a).unwrap();
        assert_eq!(msg.explicit_public_key(), None);
        assert!(msg.cose_key_hex().is_some());
    }

    #[test]
    fn test_binding_said() {
        let config = BindingConfig::new(ISSUER_AID);
        let msg = BindingMessage::new(&config, args()).unwrap();

        let said = msg.said().unwrap();
        assert_eq!(said.len(), 44);
        assert!(said.starts_with('E'));
        assert_eq!(said, msg.said().unwrap());
        assert!(msg.verify_said(&said).unwrap());

        let mut other = args();
        other.created_at = Some(CREATED_AT + 1);
        let other = BindingMessage::new(&config, other).unwrap();
        assert!(!other.verify_said(&said).unwrap());
    }
}
