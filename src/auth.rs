//! Auth-domain identifiers, secrets, per-flow configuration, and the external identity key.

pub mod config;
pub mod id;
pub mod key;
pub mod secret;

pub use config::*;
pub use id::*;
pub use key::*;
pub use secret::*;
