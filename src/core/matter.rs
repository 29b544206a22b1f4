use crate::core::codes::{extract_code, pad_size, raw_size, sizage};
/// Matter - Base class for all CESR primitives
use crate::error::{BindingError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Matter is the base class for all CESR (Composable Event Streaming Representation) primitives.
/// It handles encoding/decoding between raw bytes and qb64 (qualified base64).
///
/// Fixed size codes occupy the characters that the zero lead bytes would
/// otherwise produce, so `code.len() == pad_size(raw.len())` and the full
/// qb64 string always has a length divisible by four.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matter {
    /// CESR code identifying the primitive type
    code: String,
    /// Raw binary data
    raw: Vec<u8>,
    /// Qualified base64 encoding (code + base64 data)
    qb64: String,
}

impl Matter {
    /// Create Matter from raw bytes and code
    pub fn from_raw(raw: &[u8], code: &str) -> Result<Self> {
        let sz = sizage(code)?;
        let expected_size = raw_size(code)?;

        if raw.len() != expected_size {
            return Err(BindingError::InvalidSize {
                expected: expected_size,
                actual: raw.len(),
            });
        }

        let cs = sz.hs + sz.ss;
        let ps = pad_size(raw.len());
        if cs != ps {
            return Err(BindingError::InvalidCode(format!(
                "Code {} size {} does not match pad size {}",
                code, cs, ps
            )));
        }

        let mut padded = vec![0u8; ps];
        padded.extend_from_slice(raw);
        let b64 = URL_SAFE_NO_PAD.encode(&padded);
        let qb64 = format!("{}{}", code, &b64[cs..]);

        Ok(Self {
            code: code.to_string(),
            raw: raw.to_vec(),
            qb64,
        })
    }

    /// Create Matter from qb64 string
    pub fn from_qb64(qb64: &str) -> Result<Self> {
        if qb64.is_empty() {
            return Err(BindingError::InvalidCesr("Empty qb64 string".to_string()));
        }

        // Extract code
        let code = extract_code(qb64)?;
        let sz = sizage(&code)?;

        // Validate length
        let fs = sz.fs.ok_or_else(|| {
            BindingError::InvalidCode(format!("Variable size code not supported: {}", code))
        })?;
        if qb64.len() != fs {
            return Err(BindingError::InvalidSize {
                expected: fs,
                actual: qb64.len(),
            });
        }

        // Restore the lead pad characters the code stands in for
        let cs = sz.hs + sz.ss;
        let mut base = "A".repeat(cs);
        base.push_str(&qb64[cs..]);
        let paw = URL_SAFE_NO_PAD.decode(base.as_bytes())?;

        let ps = cs;
        if paw[..ps].iter().any(|b| *b != 0) {
            return Err(BindingError::InvalidCesr(format!(
                "Non-zero lead pad bits in {} primitive",
                code
            )));
        }
        let raw = paw[ps..].to_vec();

        // Verify raw size
        let expected_raw_size = raw_size(&code)?;
        if raw.len() != expected_raw_size {
            return Err(BindingError::InvalidSize {
                expected: expected_raw_size,
                actual: raw.len(),
            });
        }

        Ok(Self {
            code,
            raw,
            qb64: qb64.to_string(),
        })
    }

    /// Get the CESR code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the raw binary data
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Get the qb64 string
    pub fn qb64(&self) -> &str {
        &self.qb64
    }
}
