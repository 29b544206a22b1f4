//! Cardano/KERI binding: ties a Cardano wallet key to a KERI identifier
//!
//! Both wallets sign the same canonical message; the proofs are normalised
//! into a fixed-order redeemer that an on-chain validator consumes.

pub mod app;
pub mod binding;
pub mod config;
pub mod core;
pub mod error;

// Rustler NIF module for Elixir integration
// Only compile when not testing (NIF requires Erlang runtime)
#[cfg(all(feature = "nif", not(test)))]
pub mod nif;

// Re-export commonly used types
pub use app::{KeyState, KeyStateClient};
pub use binding::{
    BindingMessage, BindingMessageArgs, BindingRedeemer, BindingValidator, CanonicalMessage,
    ParsedCesrSignature, ParsedCoseSignature, ParsedKeriAid, RedeemerField, SignatureVerification,
};
pub use config::{BindingConfig, KeriaConfig};
pub use core::{matter_codes, Cigar, Diger, Matter, Saider, Verfer};
pub use error::{BindingError, ErrorCategory, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::testing::*;
    use ed25519_dalek::SigningKey;
    use rand::rngs::OsRng;

    fn wallet_outputs(
        cardano: &SigningKey,
        holder: &SigningKey,
        cardano_key_field: String,
    ) -> (BindingMessageArgs, String) {
        let aid = holder_aid(holder);
        let canonical = CanonicalMessage::build(&aid, CARDANO_ADDRESS, CREATED_AT).unwrap();
        let args = BindingMessageArgs {
            holder_aid: aid,
            cardano_address: CARDANO_ADDRESS.to_string(),
            cardano_public_key_or_cose_key: cardano_key_field,
            cardano_signature: cose_sign1_hex(cardano, canonical.as_bytes()),
            keri_signature: cesr_signature(holder, canonical.as_bytes()),
            created_at: Some(CREATED_AT),
        };
        (args, canonical)
    }

    /// Full flow: wallets sign, redeemer is assembled, verifier accepts it
    #[test]
    fn test_integration_bind_and_verify() {
        let cardano = SigningKey::generate(&mut OsRng);
        let holder = SigningKey::generate(&mut OsRng);
        let cardano_pk = cardano.verifying_key().to_bytes();
        let config = BindingConfig::new(ISSUER_AID);

        let (args, canonical) = wallet_outputs(&cardano, &holder, cose_key_hex(&cardano_pk));
        let msg = BindingMessage::new(&config, args).unwrap();
        let redeemer = BindingRedeemer::from_message(&msg).unwrap();

        assert_eq!(redeemer.cardano_public_key(), hex::encode(cardano_pk));
        assert_eq!(
            redeemer.holder_public_key(),
            hex::encode(holder.verifying_key().to_bytes())
        );
        assert_eq!(redeemer.canonical_message_text().unwrap(), canonical);
        assert_eq!(redeemer.binding_said(), hex::encode(msg.said().unwrap()));
        assert!(msg.verify_said(&msg.said().unwrap()).unwrap());

        let signer_hash = BindingValidator::cardano_key_hash(&cardano_pk).unwrap();
        let report = BindingValidator::verify_binding(
            &redeemer,
            canonical.as_bytes(),
            None,
            [signer_hash],
            &config,
        )
        .unwrap();
        assert!(report.is_sound());

        // The plutus form carries the same 13 values
        let plutus = redeemer.to_plutus_json();
        assert_eq!(plutus["fields"].as_array().unwrap().len(), 13);
        assert_eq!(plutus["fields"][12]["int"], CREATED_AT);
    }

    /// A proof replayed by a wallet holding another key is rejected
    #[test]
    fn test_integration_replayed_binding_rejected() {
        let cardano = cardano_key();
        let holder = holder_key();
        let cardano_pk = cardano.verifying_key().to_bytes();
        let config = BindingConfig::new(ISSUER_AID);

        let (args, canonical) = wallet_outputs(&cardano, &holder, hex::encode(cardano_pk));
        let redeemer =
            BindingRedeemer::from_message(&BindingMessage::new(&config, args).unwrap()).unwrap();

        let attacker = SigningKey::from_bytes(&[0x33; 32]).verifying_key().to_bytes();
        let attacker_hash = BindingValidator::cardano_key_hash(&attacker).unwrap();

        assert!(!BindingValidator::check_signer_binding(
            &cardano_pk,
            [attacker_hash]
        ));
        let err = BindingValidator::verify_binding(
            &redeemer,
            canonical.as_bytes(),
            None,
            [attacker_hash],
            &config,
        )
        .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::SignerMismatch);
    }

    /// Same inputs give the same redeemer and SAID
    #[test]
    fn test_integration_assembly_deterministic() {
        let cardano = cardano_key();
        let holder = holder_key();
        let config = BindingConfig::new(ISSUER_AID);
        let key_field = hex::encode(cardano.verifying_key().to_bytes());

        let build = || {
            let (args, _) = wallet_outputs(&cardano, &holder, key_field.clone());
            BindingRedeemer::from_message(&BindingMessage::new(&config, args).unwrap()).unwrap()
        };
        let first = build();
        let second = build();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_integration_literal_wallet_outputs() {
        let aid = ParsedKeriAid::parse("EDr7pprL3UJ_aoi3wz8wX4I75BUgpanhQdcBbTNb7UCV").unwrap();
        assert_eq!(aid.public_key().len(), 32);
        assert!(aid.public_key_hex().starts_with("00afba69acbd"));

        let sig = ParsedCesrSignature::parse(
            "0BA3jnHR0UjwZrKLkxOK4ZsJ7ve0ESQojyfPTbvohAe_M70WOVkROMlTPS4JabkKYrBSL-8LG5s9xxPKuJ5dJD4M",
        )
        .unwrap();
        assert_eq!(sig.signature().len(), 64);
        assert_eq!(sig.code(), "0B");

        // Three element COSE array
        let short = hex::encode(cbor(&ciborium::value::Value::Array(vec![
            ciborium::value::Value::Bytes(vec![0xa0]),
            ciborium::value::Value::Map(vec![]),
            ciborium::value::Value::Bytes(b"payload".to_vec()),
        ])));
        let err = ParsedCoseSignature::parse(&short, None).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::MalformedEncoding);
    }

    #[test]
    fn test_integration_config_from_json() {
        let config = BindingConfig::from_json_str(&format!(
            r#"{{"issuer_aid": "{}", "keria": {{"url": "http://127.0.0.1:9", "timeout_secs": 1}}}}"#,
            ISSUER_AID
        ))
        .unwrap();
        assert_eq!(config.keri_version, "1.0");
        assert!(config.require_signer_binding);

        // Holder key resolution surfaces as a collaborator failure when the agent is down
        let keria = config.keria.as_ref().unwrap();
        let client = KeyStateClient::new(keria).unwrap();
        let err = tokio_test::block_on(client.key_state(ISSUER_AID)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Collaborator);
    }
}
