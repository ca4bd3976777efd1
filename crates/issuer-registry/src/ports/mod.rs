//! # Ports Module
//!
//! Inbound API and outbound dependency traits.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
