use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{LedgerError, expense::Expense, registry::ItemKind};

/// On-disk layout of the workbook. Missing tables deserialize as empty so
/// older or hand-edited files keep loading.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct BookFile {
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl BookFile {
    pub(crate) fn set_names(&mut self, kind: ItemKind, names: Vec<String>) {
        match kind {
            ItemKind::Account => self.accounts = names,
            ItemKind::Category => self.categories = names,
        }
    }

    /// Rewrites every expense whose `kind` column equals `old` to `new`,
    /// returning how many rows changed.
    pub(crate) fn replace_refs(&mut self, kind: ItemKind, old: &str, new: &str) -> usize {
        let mut touched = 0;
        for expense in &mut self.expenses {
            let column = match kind {
                ItemKind::Account => &mut expense.account,
                ItemKind::Category => &mut expense.category,
            };
            if column == old {
                *column = new.to_string();
                touched += 1;
            }
        }
        touched
    }
}

/// The single JSON file behind the ledger.
///
/// Every mutation is a full read-modify-write through a `.tmp` sibling, so
/// a crash mid-save leaves the previous file intact. A missing file reads
/// as empty tables and is created on the first write.
#[derive(Clone, Debug)]
pub(crate) struct Workbook {
    path: PathBuf,
}

impl Workbook {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Current tables. A missing file is not an error here, only an
    /// unreadable one.
    pub(crate) fn tables(&self) -> Result<BookFile, LedgerError> {
        Ok(self.read()?)
    }

    /// Applies `f` to the current tables and persists the result.
    pub(crate) fn update<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut BookFile) -> T,
    {
        let mut file = self.read()?;
        let out = f(&mut file);
        self.write(&file)?;
        Ok(out)
    }

    /// Writes a fresh workbook with the given registries and no expenses,
    /// without reading whatever may already be at the path.
    pub(crate) fn initialize(
        &self,
        accounts: Vec<String>,
        categories: Vec<String>,
    ) -> Result<(), LedgerError> {
        let file = BookFile {
            accounts,
            categories,
            expenses: Vec::new(),
        };
        self.write(&file)?;
        Ok(())
    }

    fn read(&self) -> io::Result<BookFile> {
        if !self.path.exists() {
            return Ok(BookFile::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw).map_err(|e| io::Error::other(format!("malformed workbook: {e}")))
    }

    fn write(&self, file: &BookFile) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(file)
            .map_err(|_| io::Error::other("serialize failed"))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        match fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(&tmp, &self.path)?;
                let _ = fs::remove_file(&tmp);
                Ok(())
            }
        }
    }
}
