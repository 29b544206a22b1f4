//! Cardano/KERI dual-signature binding
//!
//! Builds the canonical message both wallets sign, parses what each wallet
//! returns, and assembles and validates the on-chain redeemer.

pub mod cesr;
pub mod cose;
pub mod message;
pub mod redeemer;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use cesr::{ParsedCesrSignature, ParsedKeriAid};
pub use cose::ParsedCoseSignature;
pub use message::{BindingMessage, BindingMessageArgs, CanonicalMessage};
pub use redeemer::{BindingRedeemer, RedeemerField};
pub use validator::{BindingValidator, SignatureVerification};
