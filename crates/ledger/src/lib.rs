use std::path::{Path, PathBuf};

pub use error::LedgerError;
pub use expense::Expense;
pub use flows::{SessionCoordinator, Unauthorized};
pub use money::MoneyCents;
pub use registry::{DEFAULT_ACCOUNTS, DEFAULT_CATEGORIES, ItemKind};
pub use session::{ActorId, Choice, FlowKind, Reply};

use registry::Registry;
use workbook::Workbook;

mod error;
mod expense;
mod flows;
mod money;
mod registry;
mod session;
mod workbook;

/// Where the workbook lives unless the builder is told otherwise.
pub const DEFAULT_WORKBOOK_PATH: &str = "config/workbook.json";

type ResultLedger<T> = Result<T, LedgerError>;

/// The registries plus the workbook file behind them. Reads are served
/// from memory; every mutation persists before the in-memory lists are
/// committed, so a failed write leaves both sides as they were.
#[derive(Debug)]
pub struct Ledger {
    book: Workbook,
    accounts: Registry,
    categories: Registry,
}

impl Ledger {
    /// Return a builder for `Ledger`.
    pub fn builder() -> LedgerBuilder {
        LedgerBuilder::default()
    }

    pub fn workbook_path(&self) -> &Path {
        self.book.path()
    }

    /// True until onboarding has created the workbook file.
    pub fn is_first_run(&self) -> bool {
        !self.book.exists()
    }

    pub fn items(&self, kind: ItemKind) -> &[String] {
        self.registry(kind).names()
    }

    /// Adds a trimmed name to the registry and persists the table.
    pub fn add_item(&mut self, kind: ItemKind, raw: &str) -> ResultLedger<String> {
        let mut updated = self.registry(kind).clone();
        let name = updated.add(raw)?;
        let names = updated.names().to_vec();
        self.book.update(|file| file.set_names(kind, names))?;
        *self.registry_mut(kind) = updated;
        Ok(name)
    }

    /// Removes a name, rewriting expense rows that referenced it to the
    /// kind's placeholder. Returns how many rows were rewritten.
    pub fn remove_item(&mut self, kind: ItemKind, name: &str) -> ResultLedger<usize> {
        let mut updated = self.registry(kind).clone();
        updated.remove(name)?;
        let names = updated.names().to_vec();
        let placeholder = kind.removal_placeholder();
        let touched = self.book.update(|file| {
            file.set_names(kind, names);
            file.replace_refs(kind, name, placeholder)
        })?;
        *self.registry_mut(kind) = updated;
        Ok(touched)
    }

    /// Renames `old`, carrying the change into expense rows. Returns how
    /// many rows were rewritten; renaming to the same name is a no-op
    /// success that never touches the file.
    pub fn rename_item(&mut self, kind: ItemKind, old: &str, raw_new: &str) -> ResultLedger<usize> {
        let mut updated = self.registry(kind).clone();
        let Some(new) = updated.rename(old, raw_new)? else {
            return Ok(0);
        };
        let names = updated.names().to_vec();
        let touched = self.book.update(|file| {
            file.set_names(kind, names);
            file.replace_refs(kind, old, &new)
        })?;
        *self.registry_mut(kind) = updated;
        Ok(touched)
    }

    /// Appends one expense row, creating the workbook if it is missing.
    pub fn record_expense(&mut self, expense: Expense) -> ResultLedger<()> {
        self.book.update(|file| file.expenses.push(expense))
    }

    pub fn expenses(&self) -> ResultLedger<Vec<Expense>> {
        Ok(self.book.tables()?.expenses)
    }

    /// Onboarding commit: creates the workbook in one write with the
    /// entered accounts, the default categories and no expenses.
    pub fn initialize(&mut self, accounts: Vec<String>) -> ResultLedger<()> {
        let categories = ItemKind::Category.defaults();
        self.book.initialize(accounts.clone(), categories.clone())?;
        self.accounts = Registry::new(ItemKind::Account, accounts);
        self.categories = Registry::new(ItemKind::Category, categories);
        Ok(())
    }

    fn registry(&self, kind: ItemKind) -> &Registry {
        match kind {
            ItemKind::Account => &self.accounts,
            ItemKind::Category => &self.categories,
        }
    }

    fn registry_mut(&mut self, kind: ItemKind) -> &mut Registry {
        match kind {
            ItemKind::Account => &mut self.accounts,
            ItemKind::Category => &mut self.categories,
        }
    }
}

/// The builder for `Ledger`.
#[derive(Debug, Default)]
pub struct LedgerBuilder {
    workbook_path: Option<PathBuf>,
}

impl LedgerBuilder {
    pub fn workbook_path(mut self, path: impl Into<PathBuf>) -> LedgerBuilder {
        self.workbook_path = Some(path.into());
        self
    }

    /// Construct `Ledger`. A missing workbook stays missing (that is the
    /// first-run signal); an unreadable one is logged and replaced in
    /// memory by the built-in defaults, never rewritten on disk.
    pub fn build(self) -> Ledger {
        let path = self
            .workbook_path
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK_PATH));
        let book = Workbook::new(path);

        let file = if book.exists() {
            match book.tables() {
                Ok(file) => Some(file),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %book.path().display(),
                        "workbook is unreadable, starting from built-in defaults"
                    );
                    None
                }
            }
        } else {
            None
        };
        let (accounts, categories) = match file {
            Some(file) => (file.accounts, file.categories),
            None => (ItemKind::Account.defaults(), ItemKind::Category.defaults()),
        };

        Ledger {
            book,
            accounts: Registry::new(ItemKind::Account, accounts),
            categories: Registry::new(ItemKind::Category, categories),
        }
    }
}
