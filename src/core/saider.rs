//! SAID (Self-Addressing Identifier) support
//!
//! Provides Saider for creating and verifying SAIDs over JSON data

use crate::core::codes::matter_codes;
use crate::core::diger::Diger;
use crate::core::matter::Matter;
use crate::error::{BindingError, Result};
use serde_json::Value;

const DUMMY: char = '#';

/// Saider - Self-Addressing Identifier
///
/// A Saider is a Matter-based digest that can be embedded in a data structure
/// to make it self-addressing.
#[derive(Debug, Clone)]
pub struct Saider {
    matter: Matter,
}

impl Saider {
    /// Create Saider from qb64
    pub fn from_qb64(qb64: &str) -> Result<Self> {
        let matter = Matter::from_qb64(qb64)?;
        if matter.code() != matter_codes::BLAKE3_256 {
            return Err(BindingError::InvalidCode(format!(
                "Unsupported SAID code: {}",
                matter.code()
            )));
        }
        Ok(Self { matter })
    }

    /// Get the qb64 representation
    pub fn qb64(&self) -> String {
        self.matter.qb64().to_string()
    }

    /// Compute the SAID of a JSON object
    ///
    /// The label is filled with `#` placeholders of the final qb64 length
    /// while hashing, so the digest does not depend on any prior value.
    pub fn derive(sad: &Value, label: &str) -> Result<Self> {
        let mut dummied = sad.clone();
        let obj = dummied.as_object_mut().ok_or_else(|| {
            BindingError::SerializationError("SAD must be a JSON object".to_string())
        })?;
        if !obj.contains_key(label) {
            return Err(BindingError::MissingField(format!(
                "Missing id field labeled={} in sad",
                label
            )));
        }

        let size = said_size()?;
        obj.insert(
            label.to_string(),
            Value::String(DUMMY.to_string().repeat(size)),
        );

        let ser = serde_json::to_vec(&dummied)?;
        let diger = Diger::new(matter_codes::BLAKE3_256, &ser)?;
        Ok(Self {
            matter: diger.matter().clone(),
        })
    }

    /// Verify that the SAID embedded at `label` matches the data
    pub fn verify(&self, sad: &Value, label: &str) -> Result<bool> {
        let derived = Self::derive(sad, label)?;
        Ok(derived.matter.raw() == self.matter.raw())
    }
}

fn said_size() -> Result<usize> {
    crate::core::codes::sizage(matter_codes::BLAKE3_256)?
        .fs
        .ok_or_else(|| BindingError::InvalidCode("SAID code must be fixed size".to_string()))
}
