use std::fs;
use std::path::PathBuf;

use ledger::{
    DEFAULT_ACCOUNTS, DEFAULT_CATEGORIES, Expense, FlowKind, ItemKind, Ledger, LedgerError,
    MoneyCents, Reply, SessionCoordinator, Unauthorized,
};
use uuid::Uuid;

const USER: u64 = 7;
const INTRUDER: u64 = 99;

fn book_path() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_books");
    fs::create_dir_all(&root).unwrap();
    root.join(format!("book_{}.json", Uuid::new_v4()))
}

fn ledger_with_accounts(accounts: &[&str]) -> (Ledger, PathBuf) {
    let path = book_path();
    let mut ledger = Ledger::builder().workbook_path(&path).build();
    ledger
        .initialize(accounts.iter().map(|a| a.to_string()).collect())
        .unwrap();
    (ledger, path)
}

fn expense(name: &str, account: &str, category: &str, cents: i64) -> Expense {
    Expense {
        name: name.to_string(),
        account: account.to_string(),
        category: category.to_string(),
        amount: MoneyCents::new(cents),
    }
}

fn data_for(reply: &Reply, label: &str) -> String {
    reply
        .choices
        .iter()
        .find(|c| c.label == label)
        .unwrap_or_else(|| panic!("no choice labelled {label:?} in {reply:?}"))
        .data
        .clone()
}

#[test]
fn missing_workbook_means_first_run_with_default_registries() {
    let path = book_path();
    let ledger = Ledger::builder().workbook_path(&path).build();

    assert!(ledger.is_first_run());
    assert_eq!(ledger.items(ItemKind::Account), DEFAULT_ACCOUNTS);
    assert_eq!(ledger.items(ItemKind::Category), DEFAULT_CATEGORIES);
}

#[test]
fn unreadable_workbook_falls_back_to_defaults_without_rewriting() {
    let path = book_path();
    fs::write(&path, "not json at all").unwrap();

    let mut ledger = Ledger::builder().workbook_path(&path).build();
    assert!(!ledger.is_first_run());
    assert_eq!(ledger.items(ItemKind::Account), DEFAULT_ACCOUNTS);
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");

    // Mutations go through a read of the broken file and must fail loudly
    // instead of clobbering it.
    let err = ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Storage(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json at all");
}

#[test]
fn initialize_writes_accounts_default_categories_and_no_expenses() {
    let (ledger, path) = ledger_with_accounts(&["Cash", "Bank"]);

    assert!(!ledger.is_first_run());
    assert_eq!(ledger.items(ItemKind::Account), ["Cash", "Bank"]);
    assert_eq!(ledger.items(ItemKind::Category), DEFAULT_CATEGORIES);
    assert!(ledger.expenses().unwrap().is_empty());

    let reloaded = Ledger::builder().workbook_path(&path).build();
    assert_eq!(reloaded.items(ItemKind::Account), ["Cash", "Bank"]);
    assert_eq!(reloaded.items(ItemKind::Category), DEFAULT_CATEGORIES);
}

#[test]
fn record_expense_creates_the_workbook_when_missing() {
    let path = book_path();
    let mut ledger = Ledger::builder().workbook_path(&path).build();
    assert!(ledger.is_first_run());

    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();

    assert!(path.exists());
    assert!(!ledger.is_first_run());
    let rows = ledger.expenses().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, MoneyCents::new(450));
}

#[test]
fn added_items_survive_a_reload() {
    let (mut ledger, path) = ledger_with_accounts(&["Cash"]);

    ledger.add_item(ItemKind::Account, " Savings ").unwrap();
    ledger.add_item(ItemKind::Category, "Coffee shops").unwrap();
    ledger
        .record_expense(expense("Espresso", "Savings", "Coffee shops", 120))
        .unwrap();

    let reloaded = Ledger::builder().workbook_path(&path).build();
    assert_eq!(reloaded.items(ItemKind::Account), ["Cash", "Savings"]);
    assert!(reloaded.items(ItemKind::Category).contains(&"Coffee shops".to_string()));
    let rows = reloaded.expenses().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account, "Savings");
}

#[test]
fn duplicate_add_is_rejected_and_not_persisted() {
    let (mut ledger, path) = ledger_with_accounts(&["Cash"]);

    let err = ledger.add_item(ItemKind::Account, "Cash").unwrap_err();
    assert_eq!(err, LedgerError::DuplicateName("Cash".to_string()));

    let reloaded = Ledger::builder().workbook_path(&path).build();
    assert_eq!(reloaded.items(ItemKind::Account), ["Cash"]);
}

#[test]
fn last_account_cannot_be_removed() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);

    let err = ledger.remove_item(ItemKind::Account, "Cash").unwrap_err();
    assert_eq!(err, LedgerError::LastAccount);
    assert_eq!(ledger.items(ItemKind::Account), ["Cash"]);
}

#[test]
fn removal_rewrites_referencing_rows_to_the_placeholder() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank"]);
    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();
    ledger
        .record_expense(expense("Lunch", "Cash", "Food", 1200))
        .unwrap();
    ledger
        .record_expense(expense("Rent", "Bank", "Housing", 90000))
        .unwrap();

    let touched = ledger.remove_item(ItemKind::Account, "Cash").unwrap();
    assert_eq!(touched, 2);
    assert_eq!(ledger.items(ItemKind::Account), ["Bank"]);

    let rows = ledger.expenses().unwrap();
    assert_eq!(rows[0].account, "[Deleted Account]");
    assert_eq!(rows[1].account, "[Deleted Account]");
    assert_eq!(rows[2].account, "Bank");
}

#[test]
fn category_removal_uses_its_own_placeholder() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();

    let touched = ledger.remove_item(ItemKind::Category, "Food").unwrap();
    assert_eq!(touched, 1);
    assert_eq!(ledger.expenses().unwrap()[0].category, "[Deleted Category]");
}

#[test]
fn rename_carries_into_expense_rows_and_persists() {
    let (mut ledger, path) = ledger_with_accounts(&["Cash", "Bank"]);
    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();

    let touched = ledger
        .rename_item(ItemKind::Account, "Cash", "Wallet")
        .unwrap();
    assert_eq!(touched, 1);
    assert_eq!(ledger.items(ItemKind::Account), ["Wallet", "Bank"]);
    assert_eq!(ledger.expenses().unwrap()[0].account, "Wallet");

    let reloaded = Ledger::builder().workbook_path(&path).build();
    assert_eq!(reloaded.items(ItemKind::Account), ["Wallet", "Bank"]);
}

#[test]
fn rename_to_same_name_is_a_no_op_without_a_write() {
    let (mut ledger, path) = ledger_with_accounts(&["Cash", "Bank"]);
    let before = fs::read_to_string(&path).unwrap();

    let touched = ledger.rename_item(ItemKind::Account, "Cash", "Cash").unwrap();
    assert_eq!(touched, 0);
    assert_eq!(ledger.items(ItemKind::Account), ["Cash", "Bank"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn first_run_gates_every_flow_except_onboarding() {
    let path = book_path();
    let ledger = Ledger::builder().workbook_path(&path).build();
    let mut sessions = SessionCoordinator::new(USER);

    let gate = "Please complete the initial setup first by using the /start command.";
    for kind in [
        FlowKind::Entry,
        FlowKind::AddItem(ItemKind::Account),
        FlowKind::RenameItem(ItemKind::Category),
        FlowKind::RemoveItem(ItemKind::Account),
    ] {
        let reply = sessions.begin(&ledger, USER, kind).unwrap();
        assert_eq!(reply.text, gate);
        assert!(!sessions.has_session(USER));
    }

    let reply = sessions.begin(&ledger, USER, FlowKind::Onboarding).unwrap();
    assert!(reply.text.starts_with("Welcome to your financial tracker!"));
    assert!(sessions.has_session(USER));
}

#[test]
fn onboarding_collects_accounts_and_commits_once() {
    let path = book_path();
    let mut ledger = Ledger::builder().workbook_path(&path).build();
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Onboarding).unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    assert!(reply.text.contains("Account 'Cash' added!"));
    let more = data_for(&reply, "Yes, add another");
    let reply = sessions.on_selection(&mut ledger, USER, &more).unwrap();
    assert_eq!(
        reply.text,
        "Let's add another account. What would you like to call it?"
    );

    let reply = sessions.on_message(&mut ledger, USER, "Bank").unwrap().unwrap();
    assert!(ledger.is_first_run());

    let done = data_for(&reply, "No, I'm done");
    let reply = sessions.on_selection(&mut ledger, USER, &done).unwrap();
    assert!(reply.text.contains("Setup complete!"));
    assert!(!sessions.has_session(USER));

    assert!(!ledger.is_first_run());
    assert_eq!(ledger.items(ItemKind::Account), ["Cash", "Bank"]);
    assert_eq!(ledger.items(ItemKind::Category), DEFAULT_CATEGORIES);
    assert!(ledger.expenses().unwrap().is_empty());
}

#[test]
fn onboarding_rejects_duplicates_and_empty_names() {
    let path = book_path();
    let mut ledger = Ledger::builder().workbook_path(&path).build();
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Onboarding).unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "   ").unwrap().unwrap();
    assert_eq!(
        reply.text,
        "Account name cannot be empty. Please enter a valid name:"
    );

    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    let more = data_for(&reply, "Yes, add another");
    sessions.on_selection(&mut ledger, USER, &more).unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    assert_eq!(
        reply.text,
        "Account 'Cash' already exists. Please enter a different name:"
    );
    assert!(reply.choices.is_empty());

    // Still collecting names after the rejection.
    let reply = sessions.on_message(&mut ledger, USER, "Bank").unwrap().unwrap();
    assert!(reply.text.contains("Account 'Bank' added!"));
}

#[test]
fn canceling_onboarding_leaves_first_run_untouched() {
    let path = book_path();
    let mut ledger = Ledger::builder().workbook_path(&path).build();
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Onboarding).unwrap();
    sessions.on_message(&mut ledger, USER, "Cash").unwrap();

    let reply = sessions.cancel(USER).unwrap();
    assert_eq!(reply.text, "Onboarding canceled. No accounts were added.");
    assert!(!sessions.has_session(USER));
    assert!(ledger.is_first_run());
    assert!(!path.exists());
}

#[test]
fn failed_onboarding_write_keeps_the_decision_state_for_a_retry() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_books");
    fs::create_dir_all(&root).unwrap();
    // A plain file sits where the workbook directory should go, so the
    // combined write cannot land.
    let obstruction = root.join(format!("blocked_{}", Uuid::new_v4()));
    fs::write(&obstruction, "").unwrap();
    let path = obstruction.join("book.json");

    let mut ledger = Ledger::builder().workbook_path(&path).build();
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Onboarding).unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    let done = data_for(&reply, "No, I'm done");

    let reply = sessions.on_selection(&mut ledger, USER, &done).unwrap();
    assert_eq!(reply.text, "Failed to save your data. Please try again later.");
    assert!(sessions.has_session(USER));
    assert!(ledger.is_first_run());

    fs::remove_file(&obstruction).unwrap();

    let reply = sessions.on_selection(&mut ledger, USER, &done).unwrap();
    assert!(reply.text.contains("Setup complete!"));
    assert!(!sessions.has_session(USER));
    assert!(!ledger.is_first_run());
    assert_eq!(ledger.items(ItemKind::Account), ["Cash"]);
}

#[test]
fn entry_flow_records_a_complete_expense() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    assert_eq!(reply.text, "Please enter the name:");

    let reply = sessions.on_message(&mut ledger, USER, "Coffee").unwrap().unwrap();
    assert_eq!(reply.text, "Please select an account:");
    let cash = data_for(&reply, "Cash");

    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    assert_eq!(reply.text, "Please select a category:");
    let food = data_for(&reply, "Food");

    let reply = sessions.on_selection(&mut ledger, USER, &food).unwrap();
    assert_eq!(reply.text, "Please enter the amount:");

    let reply = sessions.on_message(&mut ledger, USER, "4.50").unwrap().unwrap();
    assert!(reply.text.starts_with("Entry saved successfully!"));
    assert!(reply.text.contains("Amount: 4.50"));
    assert!(!sessions.has_session(USER));

    let rows = ledger.expenses().unwrap();
    assert_eq!(rows, [expense("Coffee", "Cash", "Food", 450)]);
}

#[test]
fn invalid_amount_reprompts_until_a_parsable_value_arrives() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Coffee").unwrap().unwrap();
    let cash = data_for(&reply, "Cash");
    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    let food = data_for(&reply, "Food");
    sessions.on_selection(&mut ledger, USER, &food).unwrap();

    for junk in ["abc", "4.50 coffee", "1.234"] {
        let reply = sessions.on_message(&mut ledger, USER, junk).unwrap().unwrap();
        assert_eq!(reply.text, "Please enter a valid number for the amount:");
        assert!(sessions.has_session(USER));
    }
    assert!(ledger.expenses().unwrap().is_empty());

    let reply = sessions.on_message(&mut ledger, USER, "4,50").unwrap().unwrap();
    assert!(reply.text.starts_with("Entry saved successfully!"));
    assert_eq!(ledger.expenses().unwrap()[0].amount, MoneyCents::new(450));
}

#[test]
fn failed_expense_append_keeps_the_session_for_a_retry() {
    let (mut ledger, path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Coffee").unwrap().unwrap();
    let cash = data_for(&reply, "Cash");
    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    let food = data_for(&reply, "Food");
    sessions.on_selection(&mut ledger, USER, &food).unwrap();

    // The workbook turns unreadable under the live session.
    let intact = fs::read_to_string(&path).unwrap();
    fs::write(&path, "not json at all").unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "4.50").unwrap().unwrap();
    assert_eq!(reply.text, "Failed to save your data. Please try again later.");
    assert!(sessions.has_session(USER));

    // With the file back, the same session commits the same amount.
    fs::write(&path, intact).unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "4.50").unwrap().unwrap();
    assert!(reply.text.starts_with("Entry saved successfully!"));
    assert!(!sessions.has_session(USER));
    assert_eq!(ledger.expenses().unwrap(), [expense("Coffee", "Cash", "Food", 450)]);
}

#[test]
fn empty_entry_name_reprompts_in_place() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "  ").unwrap().unwrap();
    assert_eq!(reply.text, "Name cannot be empty. Please enter the name:");
    assert!(sessions.has_session(USER));

    let reply = sessions.on_message(&mut ledger, USER, "Coffee").unwrap().unwrap();
    assert_eq!(reply.text, "Please select an account:");
}

#[test]
fn entry_ends_with_advice_when_no_categories_exist() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    for name in DEFAULT_CATEGORIES {
        ledger.remove_item(ItemKind::Category, name).unwrap();
    }
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Coffee").unwrap().unwrap();
    let cash = data_for(&reply, "Cash");
    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();

    assert_eq!(
        reply.text,
        "No categories available. Please use /addcategory to add some first."
    );
    assert!(!sessions.has_session(USER));
    assert!(ledger.expenses().unwrap().is_empty());
}

#[test]
fn free_text_during_a_selection_step_reoffers_the_choices() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    sessions.on_message(&mut ledger, USER, "Coffee").unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    assert_eq!(reply.text, "Please select an account:");
    assert_eq!(reply.choices.len(), 2);
    assert!(sessions.has_session(USER));
}

#[test]
fn cancel_destroys_an_entry_session_without_committing() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    sessions.on_message(&mut ledger, USER, "Coffee").unwrap();

    let reply = sessions.cancel(USER).unwrap();
    assert_eq!(reply.text, "Operation canceled.");
    assert!(!sessions.has_session(USER));
    assert!(ledger.expenses().unwrap().is_empty());

    // No session left to feed.
    assert_eq!(sessions.on_message(&mut ledger, USER, "4.50").unwrap(), None);
}

#[test]
fn cancel_without_a_cancellable_session_says_so() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions.cancel(USER).unwrap();
    assert_eq!(reply.text, "Nothing to cancel.");

    // The registry flows keep their session across /cancel.
    sessions
        .begin(&ledger, USER, FlowKind::AddItem(ItemKind::Account))
        .unwrap();
    let reply = sessions.cancel(USER).unwrap();
    assert_eq!(reply.text, "Nothing to cancel.");
    assert!(sessions.has_session(USER));

    let reply = sessions.on_message(&mut ledger, USER, "Savings").unwrap().unwrap();
    assert_eq!(reply.text, "Account 'Savings' added successfully!");
}

#[test]
fn beginning_a_new_flow_replaces_the_old_session() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions.begin(&ledger, USER, FlowKind::Entry).unwrap();
    sessions.on_message(&mut ledger, USER, "Coffee").unwrap();

    let reply = sessions
        .begin(&ledger, USER, FlowKind::AddItem(ItemKind::Category))
        .unwrap();
    assert_eq!(reply.text, "What category would you like to add?");

    let reply = sessions.on_message(&mut ledger, USER, "Treats").unwrap().unwrap();
    assert_eq!(reply.text, "Category 'Treats' added successfully!");
    assert!(!sessions.has_session(USER));
    assert!(ledger.expenses().unwrap().is_empty());
}

#[test]
fn add_flow_reports_validation_outcomes_and_always_ends() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    sessions
        .begin(&ledger, USER, FlowKind::AddItem(ItemKind::Account))
        .unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    assert_eq!(reply.text, "Account 'Cash' already exists.");
    assert!(!sessions.has_session(USER));

    sessions
        .begin(&ledger, USER, FlowKind::AddItem(ItemKind::Account))
        .unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "   ").unwrap().unwrap();
    assert_eq!(reply.text, "Account name cannot be empty.");
    assert!(!sessions.has_session(USER));

    sessions
        .begin(&ledger, USER, FlowKind::AddItem(ItemKind::Account))
        .unwrap();
    let reply = sessions.on_message(&mut ledger, USER, "Savings").unwrap().unwrap();
    assert_eq!(reply.text, "Account 'Savings' added successfully!");
    assert_eq!(ledger.items(ItemKind::Account), ["Cash", "Savings"]);
}

#[test]
fn edit_flow_renames_with_in_place_validation() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank"]);
    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions
        .begin(&ledger, USER, FlowKind::RenameItem(ItemKind::Account))
        .unwrap();
    assert_eq!(reply.text, "Select an account to edit:");
    let cash = data_for(&reply, "Cash");

    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    assert_eq!(
        reply.text,
        "You are editing account: 'Cash'\nPlease enter the new name:"
    );

    let reply = sessions.on_message(&mut ledger, USER, "Bank").unwrap().unwrap();
    assert_eq!(
        reply.text,
        "Account 'Bank' already exists. Please enter the new name:"
    );
    assert!(sessions.has_session(USER));

    let reply = sessions.on_message(&mut ledger, USER, "Wallet").unwrap().unwrap();
    assert_eq!(
        reply.text,
        "Account renamed from 'Cash' to 'Wallet' successfully!\nUpdated 1 existing entries in the expense sheet."
    );
    assert!(!sessions.has_session(USER));
    assert_eq!(ledger.items(ItemKind::Account), ["Wallet", "Bank"]);
    assert_eq!(ledger.expenses().unwrap()[0].account, "Wallet");
}

#[test]
fn renaming_to_the_same_name_reports_zero_updates() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions
        .begin(&ledger, USER, FlowKind::RenameItem(ItemKind::Account))
        .unwrap();
    let cash = data_for(&reply, "Cash");
    sessions.on_selection(&mut ledger, USER, &cash).unwrap();

    let reply = sessions.on_message(&mut ledger, USER, "Cash").unwrap().unwrap();
    assert_eq!(
        reply.text,
        "Account renamed from 'Cash' to 'Cash' successfully!\nNo existing entries needed updating."
    );
    assert!(!sessions.has_session(USER));
}

#[test]
fn remove_flow_reports_the_cascade_warning() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank"]);
    ledger
        .record_expense(expense("Coffee", "Cash", "Food", 450))
        .unwrap();
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions
        .begin(&ledger, USER, FlowKind::RemoveItem(ItemKind::Account))
        .unwrap();
    assert_eq!(reply.text, "Select an account to remove:");
    let cash = data_for(&reply, "Cash");

    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    assert!(reply.text.starts_with("Account 'Cash' has been removed."));
    assert!(reply.text.contains("Warning: 1 expense entries used this account."));
    assert!(reply.text.contains("'[Deleted Account]'"));
    assert!(!sessions.has_session(USER));
}

#[test]
fn removing_the_last_account_is_refused() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions
        .begin(&ledger, USER, FlowKind::RemoveItem(ItemKind::Account))
        .unwrap();
    let cash = data_for(&reply, "Cash");

    let reply = sessions.on_selection(&mut ledger, USER, &cash).unwrap();
    assert_eq!(
        reply.text,
        "Cannot remove the last account. You need at least one account."
    );
    assert!(!sessions.has_session(USER));
    assert_eq!(ledger.items(ItemKind::Account), ["Cash"]);
}

#[test]
fn stale_selections_are_rejected_and_fresh_choices_offered() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash", "Bank", "Card"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions
        .begin(&ledger, USER, FlowKind::RemoveItem(ItemKind::Account))
        .unwrap();
    let stale = data_for(&reply, "Bank");

    // The item vanishes between the offer and the press.
    ledger.remove_item(ItemKind::Account, "Bank").unwrap();

    let reply = sessions.on_selection(&mut ledger, USER, &stale).unwrap();
    assert!(reply.text.starts_with("Account 'Bank' not found or already removed."));
    assert!(reply.text.contains("Select an account to remove:"));
    assert_eq!(reply.choices.len(), 2);
    assert!(sessions.has_session(USER));

    let reply = sessions.on_selection(&mut ledger, USER, "42").unwrap();
    assert!(reply.text.starts_with("That option is no longer available."));
    assert_eq!(reply.choices.len(), 2);

    let card = data_for(&reply, "Card");
    let reply = sessions.on_selection(&mut ledger, USER, &card).unwrap();
    assert_eq!(reply.text, "Account 'Card' has been removed.");
    assert_eq!(ledger.items(ItemKind::Account), ["Cash"]);
}

#[test]
fn callbacks_without_a_session_report_expiry() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    let reply = sessions.on_selection(&mut ledger, USER, "0").unwrap();
    assert_eq!(reply.text, "Session expired. Please try again.");
}

#[test]
fn unauthorized_actors_cannot_touch_sessions_or_data() {
    let (mut ledger, _path) = ledger_with_accounts(&["Cash"]);
    let mut sessions = SessionCoordinator::new(USER);

    assert_eq!(
        sessions.begin(&ledger, INTRUDER, FlowKind::Entry),
        Err(Unauthorized)
    );
    assert_eq!(
        sessions.on_message(&mut ledger, INTRUDER, "Coffee"),
        Err(Unauthorized)
    );
    assert_eq!(
        sessions.on_selection(&mut ledger, INTRUDER, "0"),
        Err(Unauthorized)
    );
    assert_eq!(sessions.cancel(INTRUDER), Err(Unauthorized));

    assert!(!sessions.has_session(INTRUDER));
    assert!(ledger.expenses().unwrap().is_empty());
    assert_eq!(ledger.items(ItemKind::Account), ["Cash"]);
}
