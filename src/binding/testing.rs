//! Wallet fixtures shared by the binding tests

use crate::core::{matter_codes, Matter};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use ciborium::value::Value;
use ed25519_dalek::{Signer, SigningKey};

pub const ISSUER_AID: &str = "EDr7pprL3UJ_aoi3wz8wX4I75BUgpanhQdcBbTNb7UCV";
pub const CARDANO_ADDRESS: &str =
    "addr_test1qz2fxv2umyhttkxyxp8x0dlpdt3k6cwng5pxj3jhsydzer3jcu5d8ps7zex2k2xt3uqxgjqnnj83ws8lhrn648jjxtwq2ytjqp";
pub const CREATED_AT: i64 = 1_700_000_000_000;
pub const PROTECTED_ADDRESS: [u8; 29] = [0x60; 29];

pub fn cardano_key() -> SigningKey {
    SigningKey::from_bytes(&[0x11; 32])
}

pub fn holder_key() -> SigningKey {
    SigningKey::from_bytes(&[0x22; 32])
}

pub fn cbor(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).unwrap();
    out
}

/// COSE_Sign1 as a CIP-30 wallet returns it from `signData`
pub fn cose_sign1_hex(key: &SigningKey, payload: &[u8]) -> String {
    cose_sign1_hex_hashed(key, payload, false)
}

/// COSE_Sign1 with an explicit `hashed` header; `payload` is used as given
pub fn cose_sign1_hex_hashed(key: &SigningKey, payload: &[u8], hashed: bool) -> String {
    let protected = cbor(&Value::Map(vec![
        (Value::Integer(1i64.into()), Value::Integer((-8i64).into())),
        (
            Value::Text("address".into()),
            Value::Bytes(PROTECTED_ADDRESS.to_vec()),
        ),
    ]));
    let unprotected = Value::Map(vec![(Value::Text("hashed".into()), Value::Bool(hashed))]);

    let to_sign = cbor(&Value::Array(vec![
        Value::Text("Signature1".into()),
        Value::Bytes(protected.clone()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]));
    let sig = key.sign(&to_sign).to_bytes().to_vec();

    hex::encode(cbor(&Value::Array(vec![
        Value::Bytes(protected),
        unprotected,
        Value::Bytes(payload.to_vec()),
        Value::Bytes(sig),
    ])))
}

/// OKP Ed25519 COSE_Key
pub fn cose_key_hex(public_key: &[u8; 32]) -> String {
    hex::encode(cbor(&Value::Map(vec![
        (Value::Integer(1i64.into()), Value::Integer(1i64.into())),
        (Value::Integer(3i64.into()), Value::Integer((-8i64).into())),
        (Value::Integer((-1i64).into()), Value::Integer(6i64.into())),
        (Value::Integer((-2i64).into()), Value::Bytes(public_key.to_vec())),
    ])))
}

/// Non-indexed CESR signature as a KERI wallet returns it
pub fn cesr_signature(key: &SigningKey, message: &[u8]) -> String {
    let sig = key.sign(message).to_bytes();
    Matter::from_raw(&sig, matter_codes::ED25519_SIG)
        .unwrap()
        .qb64()
        .to_string()
}

/// Holder AID whose 43 character body carries the full key
pub fn holder_aid(key: &SigningKey) -> String {
    format!("ED{}", URL_SAFE_NO_PAD.encode(key.verifying_key().to_bytes()))
}
