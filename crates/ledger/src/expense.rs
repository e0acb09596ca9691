use serde::{Deserialize, Serialize};

use crate::money::MoneyCents;

/// One recorded expense row in the workbook.
///
/// `account` and `category` hold the registry name the row was recorded
/// under; after a removal they may hold the deletion placeholder instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub account: String,
    pub category: String,
    pub amount: MoneyCents,
}
