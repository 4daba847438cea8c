//! Resolution stages run after canonicalization: firm identity against the
//! client master, then free-text titles against the title master.

pub mod client_resolver;
pub mod title_resolver;

pub use client_resolver::EntityResolver;
pub use title_resolver::TitleResolver;
