//! Rustler NIF bindings for Elixir
//!
//! Every NIF is stateless: inputs arrive as strings or binaries and results
//! go back as strings, JSON documents, or booleans.

use rustler::{Binary, Error as RustlerError};
use serde_json::json;

use crate::app::KeyStateClient;
use crate::binding::{
    BindingMessage, BindingMessageArgs, BindingRedeemer, BindingValidator, CanonicalMessage,
    ParsedCesrSignature, ParsedCoseSignature, ParsedKeriAid,
};
use crate::config::{BindingConfig, KeriaConfig};
use crate::error::{BindingError, Result as BindingResult};

/// Convert BindingError to Rustler error
fn to_rustler_error(err: BindingError) -> RustlerError {
    RustlerError::Term(Box::new(format!("{}", err)))
}

fn redeemer_from_json(redeemer_json: &str) -> BindingResult<BindingRedeemer> {
    Ok(serde_json::from_str(redeemer_json)?)
}

//
// Canonical message NIFs
//

#[rustler::nif]
fn canonical_message_build(
    holder_aid: String,
    cardano_address: String,
    timestamp_ms: i64,
) -> Result<String, RustlerError> {
    CanonicalMessage::build(&holder_aid, &cardano_address, timestamp_ms).map_err(to_rustler_error)
}

/// Returns `{holder_aid, cardano_address, timestamp_ms}`
#[rustler::nif]
fn canonical_message_parse(message: String) -> Result<(String, String, i64), RustlerError> {
    let parsed = CanonicalMessage::parse(&message).map_err(to_rustler_error)?;
    Ok((
        parsed.holder_aid().to_string(),
        parsed.cardano_address().to_string(),
        parsed.timestamp_ms(),
    ))
}

//
// Wallet output parsing NIFs
//

/// Returns `{signature_hex, code, algorithm}`
#[rustler::nif]
fn cesr_signature_parse(signature: String) -> Result<(String, String, String), RustlerError> {
    let parsed = ParsedCesrSignature::parse(&signature).map_err(to_rustler_error)?;
    Ok((
        parsed.signature_hex(),
        parsed.code().to_string(),
        parsed.algorithm().to_string(),
    ))
}

/// Returns the holder public key as hex
#[rustler::nif]
fn keri_aid_parse(aid: String) -> Result<String, RustlerError> {
    ParsedKeriAid::parse(&aid)
        .map(|parsed| parsed.public_key_hex())
        .map_err(to_rustler_error)
}

#[rustler::nif]
fn cose_sign1_parse(
    cose_sign1_hex: String,
    cose_key_hex: Option<String>,
) -> Result<String, RustlerError> {
    let parsed = ParsedCoseSignature::parse(&cose_sign1_hex, cose_key_hex.as_deref())
        .map_err(to_rustler_error)?;

    Ok(json!({
        "sig_structure": hex::encode(parsed.sig_structure()),
        "signature": hex::encode(parsed.signature()),
        "public_key": parsed.public_key().map(hex::encode),
        "payload": hex::encode(parsed.payload()),
        "address": parsed.address().map(hex::encode),
        "hashed": parsed.hashed(),
    })
    .to_string())
}

//
// Redeemer NIFs
//

/// Assemble a redeemer from a config JSON and the wallet outputs JSON
///
/// Returns `{binding_said, redeemer, plutus_data}`.
#[rustler::nif]
fn redeemer_assemble(config_json: String, args_json: String) -> Result<String, RustlerError> {
    let config = BindingConfig::from_json_str(&config_json).map_err(to_rustler_error)?;
    let args: BindingMessageArgs = serde_json::from_str(&args_json)
        .map_err(|e| to_rustler_error(BindingError::from(e)))?;

    let msg = BindingMessage::new(&config, args).map_err(to_rustler_error)?;
    let redeemer = BindingRedeemer::from_message(&msg).map_err(to_rustler_error)?;
    let said = msg.said().map_err(to_rustler_error)?;

    Ok(json!({
        "binding_said": said,
        "redeemer": redeemer,
        "plutus_data": redeemer.to_plutus_json(),
    })
    .to_string())
}

#[rustler::nif]
fn redeemer_validate_lengths(redeemer_json: String) -> Result<bool, RustlerError> {
    let redeemer = redeemer_from_json(&redeemer_json).map_err(to_rustler_error)?;
    BindingValidator::validate_lengths(&redeemer).map_err(to_rustler_error)?;
    Ok(true)
}

/// Returns `{cardano_valid, veridian_valid}`
#[rustler::nif]
fn redeemer_verify_signatures(
    redeemer_json: String,
    cose_payload: Binary,
    cardano_pub_key: Binary,
    holder_pub_key: Binary,
) -> Result<(bool, bool), RustlerError> {
    let redeemer = redeemer_from_json(&redeemer_json).map_err(to_rustler_error)?;
    let report = BindingValidator::verify_signatures(
        &redeemer,
        cose_payload.as_slice(),
        cardano_pub_key.as_slice(),
        holder_pub_key.as_slice(),
    )
    .map_err(to_rustler_error)?;
    Ok((report.cardano_valid, report.veridian_valid))
}

#[rustler::nif]
fn signer_binding_check(
    cardano_pub_key: Binary,
    transaction_signers: Vec<Binary>,
) -> Result<bool, RustlerError> {
    let key: &[u8; 32] = cardano_pub_key.as_slice().try_into().map_err(|_| {
        to_rustler_error(BindingError::InvalidKeyLength {
            expected: 32,
            actual: cardano_pub_key.len(),
        })
    })?;
    Ok(BindingValidator::check_signer_binding(
        key,
        transaction_signers.iter().map(|s| s.as_slice()),
    ))
}

#[rustler::nif]
fn cardano_key_hash(cardano_pub_key: Binary) -> Result<String, RustlerError> {
    BindingValidator::cardano_key_hash(cardano_pub_key.as_slice())
        .map(hex::encode)
        .map_err(to_rustler_error)
}

//
// Key state NIFs
//

/// Resolve the current holder key hex from a KERIA agent
#[rustler::nif(schedule = "DirtyIo")]
fn holder_key_state(keria_url: String, aid: String) -> Result<(String, u64), RustlerError> {
    let client = KeyStateClient::new(&KeriaConfig::new(keria_url)).map_err(to_rustler_error)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| to_rustler_error(BindingError::NetworkError(e.to_string())))?;

    let state = runtime
        .block_on(client.key_state(&aid))
        .map_err(to_rustler_error)?;
    Ok((state.current_signing_key_hex, state.sequence_number))
}

//
// Utility NIFs
//

/// Get library version
#[rustler::nif]
fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

rustler::init!(
    "Elixir.CardanoKeriBinding.Native",
    [
        // Canonical message NIFs
        canonical_message_build,
        canonical_message_parse,
        // Wallet output NIFs
        cesr_signature_parse,
        keri_aid_parse,
        cose_sign1_parse,
        // Redeemer NIFs
        redeemer_assemble,
        redeemer_validate_lengths,
        redeemer_verify_signatures,
        signer_binding_check,
        cardano_key_hash,
        // Key state NIFs
        holder_key_state,
        // Utility NIFs
        version,
    ]
);
