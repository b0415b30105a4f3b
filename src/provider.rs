//! Registration metadata the host needs to list, configure, and place the authenticator.
//!
//! `descriptor` exposes the validated [`ProviderDescriptor`]: provider id, display strings,
//! requirement choices, lifecycle flags, the configuration properties the host must render,
//! and the code exchange endpoint.

pub mod descriptor;

pub use descriptor::*;
