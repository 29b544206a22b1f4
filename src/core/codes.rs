use once_cell::sync::Lazy;
/// CESR Code tables and size definitions
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Sizage {
    pub hs: usize,         // Hard size (code length)
    pub ss: usize,         // Soft size (length descriptor size)
    pub fs: Option<usize>, // Full size (total qb64 length)
    pub ls: usize,         // Lead size (raw size mod 3)
}

impl Sizage {
    pub fn new(hs: usize, ss: usize, fs: Option<usize>, ls: usize) -> Self {
        Self { hs, ss, fs, ls }
    }
}

/// Matter code definitions
pub mod matter_codes {
    pub const ED25519N: &str = "B"; // Ed25519 non-transferable key
    pub const ED25519: &str = "D"; // Ed25519 transferable key
    pub const BLAKE3_256: &str = "E"; // Blake3 256 bit digest

    pub const ED25519_SIG: &str = "0B"; // Ed25519 signature
}

/// Size table for CESR codes
pub static SIZES: Lazy<HashMap<&'static str, Sizage>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Single character codes (1 lead byte)
    m.insert(matter_codes::ED25519N, Sizage::new(1, 0, Some(44), 0));
    m.insert(matter_codes::ED25519, Sizage::new(1, 0, Some(44), 0));
    m.insert(matter_codes::BLAKE3_256, Sizage::new(1, 0, Some(44), 0));

    // Two character codes (2 lead bytes)
    m.insert(matter_codes::ED25519_SIG, Sizage::new(2, 0, Some(88), 0));

    m
});

/// Hard size by first character
pub static HARDS: Lazy<HashMap<char, usize>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in ('A'..='Z').chain('a'..='z') {
        m.insert(c, 1);
    }
    m.insert('0', 2);
    m
});

/// Extract code from qb64 string
pub fn extract_code(qb64: &str) -> crate::error::Result<String> {
    let first_char = qb64.chars().next().ok_or_else(|| {
        crate::error::BindingError::InvalidCesr("Empty qb64 string".to_string())
    })?;
    let hard_size = HARDS.get(&first_char).ok_or_else(|| {
        crate::error::BindingError::InvalidCode(format!("Unknown code prefix: {}", first_char))
    })?;

    if qb64.len() < *hard_size || !qb64.is_char_boundary(*hard_size) {
        return Err(crate::error::BindingError::InvalidCesr(format!(
            "qb64 too short for code: {}",
            qb64
        )));
    }

    Ok(qb64[..*hard_size].to_string())
}

/// Get size info for a code
pub fn sizage(code: &str) -> crate::error::Result<&Sizage> {
    SIZES
        .get(code)
        .ok_or_else(|| crate::error::BindingError::InvalidCode(format!("Unknown code: {}", code)))
}

/// Number of zero lead bytes prepended to raw before base64 encoding
pub fn pad_size(raw_len: usize) -> usize {
    (3 - (raw_len % 3)) % 3
}

/// Calculate raw size from code
pub fn raw_size(code: &str) -> crate::error::Result<usize> {
    let sz = sizage(code)?;
    if let Some(fs) = sz.fs {
        // fs chars carry 3/4 bytes each; the hard code occupies the lead pad
        let padded = (fs * 3) / 4;
        let ps = sz.hs + sz.ss;
        Ok(padded - ps - sz.ls)
    } else {
        Err(crate::error::BindingError::InvalidCode(format!(
            "Variable size code requires explicit size: {}",
            code
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code() {
        assert_eq!(
            extract_code("DKvp4T9yNzJxQ3mH5c0v8L2fR9pD1nW6sX4jG7kB3hM8").unwrap(),
            "D"
        );
        assert_eq!(extract_code("0BABCDEFabcdef").unwrap(), "0B");
        assert!(extract_code("1AAABCDEFabcdef").is_err());
        assert!(extract_code("").is_err());
        assert!(extract_code("0").is_err());
        assert!(extract_code("-A").is_err());
    }

    #[test]
    fn test_raw_size() {
        assert_eq!(raw_size("D").unwrap(), 32); // Ed25519 key
        assert_eq!(raw_size("E").unwrap(), 32); // Blake3 digest
        assert_eq!(raw_size("0B").unwrap(), 64); // Ed25519 signature
        assert!(raw_size("0A").is_err());
    }

    #[test]
    fn test_pad_size() {
        assert_eq!(pad_size(32), 1);
        assert_eq!(pad_size(64), 2);
        assert_eq!(pad_size(16), 2);
        assert_eq!(pad_size(33), 0);
    }
}
