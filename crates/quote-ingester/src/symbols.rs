use market_core::SymbolEntry;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Default BSE table shipped with the binary.
const DEFAULT_SYMBOLS_JSON: &str = include_str!("../symbols.json");

#[derive(Error, Debug)]
pub enum SymbolTableError {
    #[error("Failed to read symbol table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid symbol table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate symbol name: {0}")]
    DuplicateName(String),

    #[error("Empty {field} in entry #{index}")]
    EmptyField { field: &'static str, index: usize },
}

/// Ordered list of tickers to ingest. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    pub fn new(entries: Vec<SymbolEntry>) -> Result<Self, SymbolTableError> {
        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(SymbolTableError::EmptyField { field: "name", index });
            }
            if entry.symbol.trim().is_empty() {
                return Err(SymbolTableError::EmptyField { field: "symbol", index });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(SymbolTableError::DuplicateName(entry.name.clone()));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of `{name, symbol, id}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, SymbolTableError> {
        let entries: Vec<SymbolEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SymbolTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SymbolTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The ten BSE large caps ingested by default.
    pub fn default_bse() -> Result<Self, SymbolTableError> {
        Self::from_json_str(DEFAULT_SYMBOLS_JSON)
    }

    /// Load from `path` when given, otherwise fall back to the default table.
    pub fn load(path: Option<&str>) -> Result<Self, SymbolTableError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::default_bse(),
        }
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
