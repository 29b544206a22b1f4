/// Error types for binding operations
use thiserror::Error;

/// Coarse failure classes surfaced to callers deciding how to report a
/// rejected binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MalformedEncoding,
    UnsupportedCode,
    InvalidLength,
    MissingField,
    SignatureInvalid,
    SignerMismatch,
    /// Configuration or upstream service failure, outside the binding core
    Collaborator,
}

#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Malformed COSE_Sign1: {0}")]
    MalformedCose(String),

    #[error("Invalid CESR encoding: {0}")]
    InvalidCesr(String),

    #[error("Invalid code: {0}")]
    InvalidCode(String),

    #[error("Unsupported signature code: {0}")]
    UnsupportedSignatureCode(String),

    #[error("Unsupported derivation code: {0}")]
    UnsupportedDerivationCode(String),

    #[error("Invalid size: expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },

    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidSignatureLength { expected: usize, actual: usize },

    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Field length mismatch for {field}: expected {expected} bytes, got {actual}")]
    FieldLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("No Cardano public key available from explicit key or COSE_Key")]
    MissingPublicKey,

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Signature verification failed (cardano valid: {cardano}, veridian valid: {veridian})")]
    SignatureInvalid { cardano: bool, veridian: bool },

    #[error("Transaction signers do not include the bound Cardano key hash {0}")]
    SignerMismatch(String),

    #[error("Cardano wallet signed a different payload: {0}")]
    PayloadMismatch(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Hex decode error: {0}")]
    HexError(#[from] hex::FromHexError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(String),
}

impl BindingError {
    /// Map onto the failure class used for user-facing reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            BindingError::MalformedEncoding(_)
            | BindingError::MalformedCose(_)
            | BindingError::InvalidCesr(_)
            | BindingError::Base64Error(_)
            | BindingError::HexError(_)
            | BindingError::SerializationError(_)
            | BindingError::JsonError(_)
            | BindingError::PayloadMismatch(_)
            | BindingError::InvalidArgument(_) => ErrorCategory::MalformedEncoding,
            BindingError::InvalidCode(_)
            | BindingError::UnsupportedSignatureCode(_)
            | BindingError::UnsupportedDerivationCode(_) => ErrorCategory::UnsupportedCode,
            BindingError::InvalidSize { .. }
            | BindingError::InvalidSignatureLength { .. }
            | BindingError::InvalidKeyLength { .. }
            | BindingError::FieldLengthMismatch { .. } => ErrorCategory::InvalidLength,
            BindingError::MissingPublicKey | BindingError::MissingField(_) => {
                ErrorCategory::MissingField
            }
            BindingError::SignatureInvalid { .. } | BindingError::CryptoError(_) => {
                ErrorCategory::SignatureInvalid
            }
            BindingError::SignerMismatch(_) => ErrorCategory::SignerMismatch,
            BindingError::Config(_)
            | BindingError::NetworkError(_)
            | BindingError::NotFound(_)
            | BindingError::ParseError(_)
            | BindingError::HttpError(_) => ErrorCategory::Collaborator,
        }
    }
}

pub type Result<T> = std::result::Result<T, BindingError>;

impl From<reqwest::Error> for BindingError {
    fn from(e: reqwest::Error) -> Self {
        BindingError::HttpError(e.to_string())
    }
}

impl From<ciborium::de::Error<std::io::Error>> for BindingError {
    fn from(e: ciborium::de::Error<std::io::Error>) -> Self {
        BindingError::MalformedEncoding(format!("CBOR decode: {}", e))
    }
}

impl From<ciborium::ser::Error<std::io::Error>> for BindingError {
    fn from(e: ciborium::ser::Error<std::io::Error>) -> Self {
        BindingError::SerializationError(format!("CBOR encode: {}", e))
    }
}
