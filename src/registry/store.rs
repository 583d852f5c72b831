//! Symbol registry document: load, mutate, persist
//!
//! The registry is a TOML file with one top-level table per instrument key.
//! Operators annotate it by hand, so edits go through `toml_edit` and leave
//! comments, ordering and unknown keys exactly as found.

use std::path::{Path, PathBuf};
use toml_edit::{value, DocumentMut, Item};
use tracing::debug;

use crate::common::errors::{Result, SyncError};
use crate::common::types::{InstrumentDescriptor, ResolvedContract};

/// In-memory registry document bound to its file path
#[derive(Debug)]
pub struct SymbolRegistry {
    path: PathBuf,
    doc: DocumentMut,
}

impl SymbolRegistry {
    /// Load the registry from disk, validating it parses as TOML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path)?;
        let doc = text
            .parse::<DocumentMut>()
            .map_err(|e| SyncError::RegistryParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { path, doc })
    }

    /// Parse a registry from a string, bound to `path` for later saves
    pub fn from_str_at(text: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = text
            .parse::<DocumentMut>()
            .map_err(|e| SyncError::RegistryParse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { path, doc })
    }

    /// Instrument keys in document order. Non-table entries are skipped,
    /// never touched.
    pub fn keys(&self) -> Vec<String> {
        self.doc
            .iter()
            .filter(|(_, item)| item.is_table() || item.is_inline_table())
            .map(|(key, _)| key.to_string())
            .collect()
    }

    /// Read one entry's recognized fields into a descriptor
    pub fn descriptor(&self, key: &str) -> Option<InstrumentDescriptor> {
        let entry = self.doc.get(key)?;
        if !(entry.is_table() || entry.is_inline_table()) {
            return None;
        }
        Some(InstrumentDescriptor {
            sec_type: str_field(entry, "sec_type"),
            symbol: str_field(entry, "symbol"),
            exchange: str_field(entry, "exchange"),
            currency: str_field(entry, "currency"),
            con_id: entry.get("con_id").and_then(Item::as_integer),
            last_trade_date: expiry_field(entry),
        })
    }

    /// Overwrite one entry's identifying fields from a resolved contract.
    ///
    /// The expiry field is written only for futures. Returns whether any
    /// value actually changed; untouched entries stay byte-identical.
    pub fn apply(&mut self, key: &str, resolved: &ResolvedContract) -> bool {
        let Some(current) = self.descriptor(key) else {
            return false;
        };

        let mut changed = false;
        if current.con_id != Some(resolved.con_id) {
            self.doc[key]["con_id"] = value(resolved.con_id);
            changed = true;
        }
        if current.symbol != resolved.symbol {
            self.doc[key]["symbol"] = value(resolved.symbol.as_str());
            changed = true;
        }
        if current.exchange != resolved.exchange {
            self.doc[key]["exchange"] = value(resolved.exchange.as_str());
            changed = true;
        }
        if current.currency != resolved.currency {
            self.doc[key]["currency"] = value(resolved.currency.as_str());
            changed = true;
        }
        if resolved.is_futures() {
            if let Some(expiry) = &resolved.last_trade_date {
                if current.last_trade_date.as_deref() != Some(expiry) {
                    self.doc[key]["last_trade_date"] = value(expiry.as_str());
                    changed = true;
                }
            }
        }

        debug!(key, changed, "applied resolved contract");
        changed
    }

    /// Write the document back to its path, preserving formatting
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.doc.to_string())?;
        Ok(())
    }

    /// Render the document without writing it
    pub fn to_document_string(&self) -> String {
        self.doc.to_string()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn str_field(entry: &Item, field: &str) -> String {
    entry
        .get(field)
        .and_then(Item::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Expiries may be curated as strings or bare integers (20260320)
fn expiry_field(entry: &Item) -> Option<String> {
    let item = entry.get("last_trade_date")?;
    item.as_str()
        .map(str::to_string)
        .or_else(|| item.as_integer().map(|i| i.to_string()))
}
