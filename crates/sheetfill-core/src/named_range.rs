//! Defined names and their reference text
//!
//! A workbook's `<definedNames>` bind symbolic names to sheet references:
//!
//! ```text
//! rngFirstName  -> Sheet1!$F$11
//! rngMedicare   -> 'Patient Info'!$C$4:$C$6
//! ```
//!
//! Only the first cell of a reference is ever targeted.

use crate::address::CellAddress;
use crate::error::{Error, Result};

/// Scope of a defined name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameScope {
    /// Available throughout the workbook (global)
    Workbook,
    /// Scoped to a specific sheet (`localSheetId`)
    Sheet(usize),
}

/// A defined name as declared in `workbook.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    /// The name (e.g. "rngFirstName"); compared case-insensitively
    pub name: String,
    /// Raw reference text (e.g. "Sheet1!$F$11:$F$13")
    pub refers_to: String,
    /// Scope of this name
    pub scope: NameScope,
    /// Whether this name is hidden from the UI
    pub hidden: bool,
}

impl DefinedName {
    /// Create a workbook-scoped defined name
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            refers_to: refers_to.into(),
            scope: NameScope::Workbook,
            hidden: false,
        }
    }

    /// Set the scope of this name
    pub fn with_scope(mut self, scope: NameScope) -> Self {
        self.scope = scope;
        self
    }

    /// Mark this name as hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Check whether this name matches a key, ignoring case
    pub fn matches(&self, key: &str) -> bool {
        self.name.to_lowercase() == key.to_lowercase()
    }
}

/// Defined names in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinedNames {
    names: Vec<DefinedName>,
}

impl DefinedNames {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name
    pub fn push(&mut self, name: DefinedName) {
        self.names.push(name);
    }

    /// Find the first name matching `key` case-insensitively
    pub fn find(&self, key: &str) -> Option<&DefinedName> {
        self.names.iter().find(|n| n.matches(key))
    }

    /// Iterate over all names in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &DefinedName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<DefinedName> for DefinedNames {
    fn from_iter<I: IntoIterator<Item = DefinedName>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

/// The sheet and first cell a defined name points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameReference {
    /// Sheet (tab) name with quoting removed
    pub sheet: String,
    /// First cell of the referenced area
    pub cell: CellAddress,
}

impl NameReference {
    /// Parse `Sheet!$Col$Row` or `Sheet!$Col$Row:$Col$Row`
    ///
    /// Quoted sheet names (`'My Sheet'!$A$1`) are unquoted, including the
    /// doubled-apostrophe escape. Anything after `:` is ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);

        let (sheet_part, area) = trimmed
            .rsplit_once('!')
            .ok_or_else(|| Error::invalid_reference(text, "missing '!' sheet separator"))?;

        let sheet = unquote_sheet_name(sheet_part);
        if sheet.is_empty() {
            return Err(Error::invalid_reference(text, "empty sheet name"));
        }

        let first = area.split(':').next().unwrap_or_default();
        let token: String = first.chars().filter(|&c| c != '$').collect();
        let cell = CellAddress::parse(&token)
            .map_err(|e| Error::invalid_reference(text, e.to_string()))?;

        Ok(Self { sheet, cell })
    }
}

fn unquote_sheet_name(raw: &str) -> String {
    let raw = raw.trim();
    match raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        Some(inner) => inner.replace("''", "'"),
        None => raw.trim_matches('\'').to_string(),
    }
}
