//! Registry module - format-preserving symbol document store

pub mod store;

pub use store::SymbolRegistry;
