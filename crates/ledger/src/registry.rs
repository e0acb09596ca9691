use crate::LedgerError;

/// Accounts shipped when the workbook is unreadable and nothing better is
/// known. Real lists come from onboarding.
pub const DEFAULT_ACCOUNTS: [&str; 3] = ["Cash", "Bank Account", "Credit Card"];

/// Categories written by onboarding and used as the read-failure fallback.
pub const DEFAULT_CATEGORIES: [&str; 8] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Utilities",
    "Shopping",
    "Health",
    "Housing",
    "Other",
];

/// The two registries the ledger keeps. Everything that differs between
/// them (display label, deletion placeholder, minimum-count rule, which
/// expense field they cascade into) hangs off this kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Account,
    Category,
}

impl ItemKind {
    /// User-facing label, capitalized ("Account 'X' already exists.").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            ItemKind::Account => "Account",
            ItemKind::Category => "Category",
        }
    }

    /// Lowercase label for mid-sentence use.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            ItemKind::Account => "account",
            ItemKind::Category => "category",
        }
    }

    #[must_use]
    pub const fn plural(self) -> &'static str {
        match self {
            ItemKind::Account => "accounts",
            ItemKind::Category => "categories",
        }
    }

    /// Value written into expense rows when the referenced item is removed.
    #[must_use]
    pub const fn removal_placeholder(self) -> &'static str {
        match self {
            ItemKind::Account => "[Deleted Account]",
            ItemKind::Category => "[Deleted Category]",
        }
    }

    pub(crate) fn defaults(self) -> Vec<String> {
        let names: &[&str] = match self {
            ItemKind::Account => &DEFAULT_ACCOUNTS,
            ItemKind::Category => &DEFAULT_CATEGORIES,
        };
        names.iter().map(|n| n.to_string()).collect()
    }
}

/// An ordered list of unique, non-empty names.
///
/// Both registries share this one implementation; only the rules attached
/// to [`ItemKind`] differ. Mutations validate here, persistence happens in
/// the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Registry {
    kind: ItemKind,
    names: Vec<String>,
}

impl Registry {
    pub(crate) fn new(kind: ItemKind, names: Vec<String>) -> Self {
        Self { kind, names }
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Appends a trimmed name, rejecting empty and duplicate values.
    /// Returns the name as stored.
    pub(crate) fn add(&mut self, raw: &str) -> Result<String, LedgerError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        if self.contains(name) {
            return Err(LedgerError::DuplicateName(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(name.to_string())
    }

    /// Removes a name. Accounts refuse to drop below one entry.
    pub(crate) fn remove(&mut self, name: &str) -> Result<(), LedgerError> {
        let Some(pos) = self.names.iter().position(|n| n == name) else {
            return Err(LedgerError::NotFound(name.to_string()));
        };
        if self.kind == ItemKind::Account && self.names.len() == 1 {
            return Err(LedgerError::LastAccount);
        }
        self.names.remove(pos);
        Ok(())
    }

    /// Renames `old` to the trimmed `raw_new`, keeping its position.
    ///
    /// Returns the stored new name, or `None` when the new name equals the
    /// old one (a no-op success, nothing to persist or cascade).
    pub(crate) fn rename(
        &mut self,
        old: &str,
        raw_new: &str,
    ) -> Result<Option<String>, LedgerError> {
        let new = raw_new.trim();
        if new.is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let Some(pos) = self.names.iter().position(|n| n == old) else {
            return Err(LedgerError::NotFound(old.to_string()));
        };
        if new == old {
            return Ok(None);
        }
        if self.contains(new) {
            return Err(LedgerError::DuplicateName(new.to_string()));
        }
        self.names[pos] = new.to_string();
        Ok(Some(new.to_string()))
    }
}
