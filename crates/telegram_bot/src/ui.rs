use ledger::{Choice, ItemKind};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Callback data carries this prefix so unrelated button presses are ignored.
const PICK_PREFIX: &str = "pick:";

pub(crate) fn keyboard(choices: &[Choice]) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = choices
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|c| {
                    InlineKeyboardButton::callback(
                        c.label.clone(),
                        format!("{PICK_PREFIX}{}", c.data),
                    )
                })
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

pub(crate) fn render_listing(kind: ItemKind, names: &[String]) -> String {
    if names.is_empty() {
        let hint = match kind {
            ItemKind::Account => "No accounts defined. Use /addaccount to add some.",
            ItemKind::Category => "No categories defined. Use /addcategory to add some.",
        };
        return hint.to_string();
    }

    let header = match kind {
        ItemKind::Account => "Your accounts:",
        ItemKind::Category => "Available categories:",
    };
    let mut text = format!("{header}\n");
    for name in names {
        text.push_str(&format!("\n• {name}"));
    }
    text
}
