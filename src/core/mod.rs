/// Core CESR primitives
pub mod cigar;
pub mod codes;
pub mod diger;
pub mod matter;
pub mod saider;
pub mod verfer;

pub use cigar::Cigar;
pub use codes::matter_codes;
pub use diger::{blake2b_224, Diger};
pub use matter::Matter;
pub use saider::Saider;
pub use verfer::{verify_ed25519, Verfer};
