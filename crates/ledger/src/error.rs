//! The module contains the errors the ledger can raise.
//!
//! Validation errors are:
//!
//! - [`EmptyName`] raised when a name is empty after trimming.
//! - [`DuplicateName`] raised when a name is already present in a registry.
//! - [`NotFound`] raised when an item is not in a registry.
//! - [`LastAccount`] raised when removing the only remaining account.
//! - [`InvalidAmount`] raised when an amount does not parse.
//!
//! [`Storage`] wraps I/O failures against the workbook file.
//!
//! [`EmptyName`]: LedgerError::EmptyName
//! [`DuplicateName`]: LedgerError::DuplicateName
//! [`NotFound`]: LedgerError::NotFound
//! [`LastAccount`]: LedgerError::LastAccount
//! [`InvalidAmount`]: LedgerError::InvalidAmount
//! [`Storage`]: LedgerError::Storage
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("name is empty")]
    EmptyName,
    #[error("\"{0}\" already present!")]
    DuplicateName(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Cannot remove the last account!")]
    LastAccount,
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Storage(#[from] std::io::Error),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyName, Self::EmptyName) => true,
            (Self::DuplicateName(a), Self::DuplicateName(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::LastAccount, Self::LastAccount) => true,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Storage(a), Self::Storage(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
