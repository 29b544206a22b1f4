//! Application-level modules
//!
//! Network collaborators used around the binding core

pub mod keystate;

pub use keystate::{KeyState, KeyStateClient};
