//! Cardano wallet material: CIP-8 COSE_Sign1 and COSE_Key
//!
//! A CIP-30 `signData` call returns a COSE_Sign1 array
//! `[protected: bstr, unprotected: map, payload: bstr, signature: bstr]`
//! and, separately, a COSE_Key map. The wallet signs the Sig_structure
//! `["Signature1", protected, h'', payload]`, which is rebuilt here from the
//! original byte strings so it matches what the on-chain verifier hashes.

use crate::binding::cesr::{PUBLIC_KEY_SIZE, SIGNATURE_SIZE};
use crate::error::{BindingError, Result};
use ciborium::value::Value;
use std::io::Cursor;
use tracing::{debug, trace};

/// Context string of a single signer COSE signature
pub const SIG_STRUCTURE_CONTEXT: &str = "Signature1";
/// Optional CBOR tag wrapping a COSE_Sign1 message
pub const COSE_SIGN1_TAG: u64 = 18;
/// COSE_Key label carrying the OKP public key (`x`)
pub const COSE_KEY_X_LABEL: i64 = -2;

/// COSE_Sign1 signature normalised for the binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCoseSignature {
    sig_structure: Vec<u8>,
    signature: [u8; SIGNATURE_SIZE],
    public_key: Option<[u8; PUBLIC_KEY_SIZE]>,
    protected_header: Vec<u8>,
    payload: Vec<u8>,
    address: Option<Vec<u8>>,
    hashed: bool,
}

impl ParsedCoseSignature {
    /// Parse a hex COSE_Sign1 and, when given, the wallet's hex COSE_Key
    pub fn parse(cose_sign1_hex: &str, cose_key_hex: Option<&str>) -> Result<Self> {
        let bytes = hex::decode(cose_sign1_hex.trim())
            .map_err(|e| BindingError::MalformedCose(format!("COSE_Sign1 hex: {}", e)))?;
        let value = decode_single(&bytes)
            .map_err(|e| BindingError::MalformedCose(format!("COSE_Sign1 CBOR: {}", e)))?;

        // CIP-30 wallets emit the untagged form; accept the tagged one too
        let value = match value {
            Value::Tag(COSE_SIGN1_TAG, inner) => *inner,
            other => other,
        };

        let items = match value {
            Value::Array(items) => items,
            _ => {
                return Err(BindingError::MalformedCose(
                    "COSE_Sign1 is not a CBOR array".to_string(),
                ))
            }
        };
        if items.len() != 4 {
            debug!(len = items.len(), "rejecting COSE_Sign1 array");
            return Err(BindingError::MalformedCose(format!(
                "COSE_Sign1 array must have 4 elements, got {}",
                items.len()
            )));
        }

        let mut items = items.into_iter();
        let protected = items.next();
        let unprotected = items.next();
        let payload = items.next();
        let signature = items.next();

        let protected_header = match protected {
            Some(Value::Bytes(b)) => b,
            _ => {
                return Err(BindingError::MalformedCose(
                    "Protected header must be a byte string".to_string(),
                ))
            }
        };
        let unprotected = match unprotected {
            Some(Value::Map(m)) => m,
            _ => {
                return Err(BindingError::MalformedCose(
                    "Unprotected header must be a map".to_string(),
                ))
            }
        };
        let payload = match payload {
            Some(Value::Bytes(b)) => b,
            Some(Value::Null) => {
                return Err(BindingError::MalformedCose(
                    "Detached payloads are not supported".to_string(),
                ))
            }
            _ => {
                return Err(BindingError::MalformedCose(
                    "Payload must be a byte string".to_string(),
                ))
            }
        };
        let signature = match signature {
            Some(Value::Bytes(b)) => b,
            _ => {
                return Err(BindingError::MalformedCose(
                    "Signature must be a byte string".to_string(),
                ))
            }
        };

        let signature: [u8; SIGNATURE_SIZE] =
            signature
                .as_slice()
                .try_into()
                .map_err(|_| BindingError::InvalidSignatureLength {
                    expected: SIGNATURE_SIZE,
                    actual: signature.len(),
                })?;

        let sig_structure = sig_structure(&protected_header, &payload)?;
        let address = protected_address(&protected_header)?;
        let hashed = matches!(text_entry(&unprotected, "hashed"), Some(Value::Bool(true)));

        let public_key = match cose_key_hex {
            Some(key_hex) => Some(parse_cose_key(key_hex)?),
            None => None,
        };

        trace!(
            sig_structure_len = sig_structure.len(),
            has_key = public_key.is_some(),
            "parsed COSE_Sign1"
        );
        Ok(Self {
            sig_structure,
            signature,
            public_key,
            protected_header,
            payload,
            address,
            hashed,
        })
    }

    /// Exact bytes the wallet signed
    pub fn sig_structure(&self) -> &[u8] {
        &self.sig_structure
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.signature
    }

    /// Key from the COSE_Key, absent when none was supplied
    pub fn public_key(&self) -> Option<&[u8; PUBLIC_KEY_SIZE]> {
        self.public_key.as_ref()
    }

    pub fn protected_header(&self) -> &[u8] {
        &self.protected_header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Raw address bytes from the protected `address` header, if present
    pub fn address(&self) -> Option<&[u8]> {
        self.address.as_deref()
    }

    /// Whether the wallet signed a blake2b-224 hash of the payload
    pub fn hashed(&self) -> bool {
        self.hashed
    }
}

/// CBOR encode `["Signature1", protected, h'', payload]`
pub fn sig_structure(protected_header: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let structure = Value::Array(vec![
        Value::Text(SIG_STRUCTURE_CONTEXT.to_string()),
        Value::Bytes(protected_header.to_vec()),
        Value::Bytes(Vec::new()),
        Value::Bytes(payload.to_vec()),
    ]);
    let mut out = Vec::new();
    ciborium::ser::into_writer(&structure, &mut out)?;
    Ok(out)
}

/// Split a Sig_structure back into (protected header, payload)
///
/// Refuses anything that is not the four element `Signature1` form with an
/// empty external AAD.
pub fn split_sig_structure(bytes: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let value = decode_single(bytes)?;
    let items = match value {
        Value::Array(items) if items.len() == 4 => items,
        _ => {
            return Err(BindingError::MalformedCose(
                "Sig_structure must be a 4 element array".to_string(),
            ))
        }
    };
    match (&items[0], &items[1], &items[2], &items[3]) {
        (Value::Text(ctx), Value::Bytes(protected), Value::Bytes(aad), Value::Bytes(payload))
            if ctx == SIG_STRUCTURE_CONTEXT && aad.is_empty() =>
        {
            Ok((protected.clone(), payload.clone()))
        }
        _ => Err(BindingError::MalformedCose(
            "Sig_structure fields have unexpected types or external AAD".to_string(),
        )),
    }
}

/// Extract the raw Ed25519 key (label -2) from a hex COSE_Key map
pub fn parse_cose_key(cose_key_hex: &str) -> Result<[u8; PUBLIC_KEY_SIZE]> {
    let bytes = hex::decode(cose_key_hex.trim())
        .map_err(|e| BindingError::MalformedCose(format!("COSE_Key hex: {}", e)))?;
    let value = decode_single(&bytes)
        .map_err(|e| BindingError::MalformedCose(format!("COSE_Key CBOR: {}", e)))?;

    let entries = match value {
        Value::Map(entries) => entries,
        _ => {
            return Err(BindingError::MalformedCose(
                "COSE_Key is not a CBOR map".to_string(),
            ))
        }
    };

    let x = entries
        .iter()
        .find(|(k, _)| matches!(k, Value::Integer(i) if i128::from(*i) == COSE_KEY_X_LABEL as i128))
        .map(|(_, v)| v)
        .ok_or_else(|| BindingError::MissingField("COSE_Key label -2".to_string()))?;

    match x {
        Value::Bytes(key) => key
            .as_slice()
            .try_into()
            .map_err(|_| BindingError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: key.len(),
            }),
        _ => Err(BindingError::MalformedCose(
            "COSE_Key label -2 is not a byte string".to_string(),
        )),
    }
}

/// Decode exactly one CBOR item, refusing trailing bytes
fn decode_single(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value: Value = ciborium::de::from_reader(&mut cursor)?;
    if cursor.position() as usize != bytes.len() {
        return Err(BindingError::MalformedEncoding(format!(
            "{} trailing bytes after CBOR item",
            bytes.len() - cursor.position() as usize
        )));
    }
    Ok(value)
}

fn text_entry<'a>(map: &'a [(Value, Value)], label: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(k, _)| matches!(k, Value::Text(t) if t == label))
        .map(|(_, v)| v)
}

/// CIP-8 puts the signing address in the protected header map
fn protected_address(protected_header: &[u8]) -> Result<Option<Vec<u8>>> {
    if protected_header.is_empty() {
        return Ok(None);
    }
    let header = decode_single(protected_header)
        .map_err(|e| BindingError::MalformedCose(format!("Protected header CBOR: {}", e)))?;
    match header {
        Value::Map(entries) => Ok(match text_entry(&entries, "address") {
            Some(Value::Bytes(addr)) => Some(addr.clone()),
            _ => None,
        }),
        _ => Err(BindingError::MalformedCose(
            "Protected header is not a CBOR map".to_string(),
        )),
    }
}
