//! Conversation state machine for the guided flows.
//!
//! The [`SessionCoordinator`] receives plain events (begin, message,
//! selection, cancel) from a transport, mutates the [`Ledger`] and the
//! per-actor session, and answers with a [`Reply`] for the transport to
//! render. Selection buttons carry list indexes; the offered names are
//! snapshotted in the session and re-checked against the live registry
//! when the press arrives.

use std::collections::HashMap;

use crate::{
    Ledger, LedgerError,
    expense::Expense,
    money::MoneyCents,
    registry::ItemKind,
    session::{
        ActorId, Choice, EntryFlow, EntryStep, Flow, FlowKind, OnboardingFlow, OnboardingStep,
        RenameStep, Reply,
    },
};

/// The event came from someone other than the configured user.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("actor is not authorized")]
pub struct Unauthorized;

/// Per-actor flow sessions plus the authorization check every event
/// passes through first. One session per actor; beginning a new flow
/// replaces whatever was in progress.
pub struct SessionCoordinator {
    authorized: ActorId,
    sessions: HashMap<ActorId, Flow>,
}

impl SessionCoordinator {
    #[must_use]
    pub fn new(authorized: ActorId) -> Self {
        Self {
            authorized,
            sessions: HashMap::new(),
        }
    }

    #[must_use]
    pub fn has_session(&self, actor: ActorId) -> bool {
        self.sessions.contains_key(&actor)
    }

    /// Starts a flow for `actor`, replacing any session in progress.
    ///
    /// While the workbook does not exist yet, only onboarding may start;
    /// everything else is answered with the setup hint. Conversely,
    /// beginning onboarding once the workbook exists just replays the
    /// welcome text without opening a session.
    pub fn begin(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        kind: FlowKind,
    ) -> Result<Reply, Unauthorized> {
        self.ensure_authorized(actor)?;

        if ledger.is_first_run() && kind != FlowKind::Onboarding {
            return Ok(Reply::text(setup_gate_text()));
        }

        let reply = match kind {
            FlowKind::Entry => {
                self.sessions.insert(actor, Flow::Entry(EntryFlow::new()));
                Reply::text(entry_name_prompt())
            }
            FlowKind::Onboarding => {
                if !ledger.is_first_run() {
                    return Ok(Reply::text(welcome_text()));
                }
                self.sessions
                    .insert(actor, Flow::Onboarding(OnboardingFlow::new()));
                Reply::text(onboarding_welcome_text())
            }
            FlowKind::AddItem(kind) => {
                self.sessions.insert(actor, Flow::AddItem { kind });
                Reply::text(add_prompt(kind))
            }
            FlowKind::RenameItem(kind) => self.offer_rename(ledger, actor, kind, None),
            FlowKind::RemoveItem(kind) => self.offer_removal(ledger, actor, kind, None),
        };
        Ok(reply)
    }

    /// Feeds a free-text message into the actor's session. `None` means
    /// there was no session; the transport stays silent then.
    pub fn on_message(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        text: &str,
    ) -> Result<Option<Reply>, Unauthorized> {
        self.ensure_authorized(actor)?;
        let Some(flow) = self.sessions.remove(&actor) else {
            return Ok(None);
        };

        let reply = match flow {
            Flow::Entry(state) => self.entry_message(ledger, actor, state, text),
            Flow::Onboarding(state) => self.onboarding_message(actor, state, text),
            Flow::AddItem { kind } => add_item_outcome(ledger, kind, text),
            Flow::RenameItem { kind, step } => self.rename_message(ledger, actor, kind, step, text),
            Flow::RemoveItem { kind, offered: _ } => self.offer_removal(ledger, actor, kind, None),
        };
        Ok(Some(reply))
    }

    /// Feeds a button press back in. `data` is the token the [`Choice`]
    /// carried out. A press with no session behind it gets the expiry
    /// notice rather than silence, since the user clearly expects an
    /// answer.
    pub fn on_selection(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        data: &str,
    ) -> Result<Reply, Unauthorized> {
        self.ensure_authorized(actor)?;
        let Some(flow) = self.sessions.remove(&actor) else {
            return Ok(Reply::text(session_expired_text()));
        };

        let reply = match flow {
            Flow::Entry(state) => self.entry_selection(ledger, actor, state, data),
            Flow::Onboarding(state) => self.onboarding_selection(ledger, actor, state, data),
            Flow::AddItem { kind } => {
                self.sessions.insert(actor, Flow::AddItem { kind });
                Reply::text(add_prompt(kind))
            }
            Flow::RenameItem { kind, step } => {
                self.rename_selection(ledger, actor, kind, step, data)
            }
            Flow::RemoveItem { kind, offered } => {
                self.remove_selection(ledger, actor, kind, &offered, data)
            }
        };
        Ok(reply)
    }

    /// `/cancel`. Entry and onboarding sessions are dropped without
    /// committing anything; the registry flows have no cancel path and
    /// keep their session.
    pub fn cancel(&mut self, actor: ActorId) -> Result<Reply, Unauthorized> {
        self.ensure_authorized(actor)?;
        let reply = match self.sessions.remove(&actor) {
            Some(Flow::Entry(_)) => Reply::text(entry_canceled_text()),
            Some(Flow::Onboarding(_)) => Reply::text(onboarding_aborted_text()),
            Some(other) => {
                self.sessions.insert(actor, other);
                Reply::text(nothing_to_cancel_text())
            }
            None => Reply::text(nothing_to_cancel_text()),
        };
        Ok(reply)
    }

    fn ensure_authorized(&self, actor: ActorId) -> Result<(), Unauthorized> {
        if actor == self.authorized {
            Ok(())
        } else {
            Err(Unauthorized)
        }
    }

    fn entry_message(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        mut state: EntryFlow,
        text: &str,
    ) -> Reply {
        match state.step {
            EntryStep::Name => {
                let name = text.trim();
                if name.is_empty() {
                    self.sessions.insert(actor, Flow::Entry(state));
                    return Reply::text(entry_empty_name_text());
                }
                state.draft.name = Some(name.to_string());
                state.step = EntryStep::Account;
                self.offer_entry_choices(ledger, actor, state, ItemKind::Account, None)
            }
            EntryStep::Account => {
                self.offer_entry_choices(ledger, actor, state, ItemKind::Account, None)
            }
            EntryStep::Category => {
                self.offer_entry_choices(ledger, actor, state, ItemKind::Category, None)
            }
            EntryStep::Amount => match text.parse::<MoneyCents>() {
                Err(_) => {
                    self.sessions.insert(actor, Flow::Entry(state));
                    Reply::text(invalid_amount_text())
                }
                Ok(amount) => {
                    let expense = state.draft.clone().into_expense(amount);
                    match ledger.record_expense(expense.clone()) {
                        Ok(()) => Reply::text(entry_summary_text(&expense)),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to append the expense row");
                            self.sessions.insert(actor, Flow::Entry(state));
                            Reply::text(storage_failure_text())
                        }
                    }
                }
            },
        }
    }

    fn entry_selection(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        mut state: EntryFlow,
        data: &str,
    ) -> Reply {
        let kind = match state.step {
            EntryStep::Account => ItemKind::Account,
            EntryStep::Category => ItemKind::Category,
            EntryStep::Name => {
                self.sessions.insert(actor, Flow::Entry(state));
                return Reply::text(entry_name_prompt());
            }
            EntryStep::Amount => {
                self.sessions.insert(actor, Flow::Entry(state));
                return Reply::text(entry_amount_prompt());
            }
        };

        match pick(&state.offered, ledger.items(kind), data) {
            Picked::Live(name) => match kind {
                ItemKind::Account => {
                    state.draft.account = Some(name);
                    state.step = EntryStep::Category;
                    self.offer_entry_choices(ledger, actor, state, ItemKind::Category, None)
                }
                ItemKind::Category => {
                    state.draft.category = Some(name);
                    state.step = EntryStep::Amount;
                    self.sessions.insert(actor, Flow::Entry(state));
                    Reply::text(entry_amount_prompt())
                }
            },
            Picked::Gone(_) | Picked::Invalid => {
                self.offer_entry_choices(ledger, actor, state, kind, Some(option_gone_text()))
            }
        }
    }

    /// Presents (or re-presents) the account/category buttons of the
    /// entry flow. With an empty registry the session ends and the user
    /// is pointed at the add command instead. `state.step` must already
    /// match `kind`.
    fn offer_entry_choices(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        mut state: EntryFlow,
        kind: ItemKind,
        lead: Option<&str>,
    ) -> Reply {
        let names = ledger.items(kind);
        if names.is_empty() {
            return Reply::text(empty_registry_advice(kind));
        }
        state.offered = names.to_vec();
        let choices = name_choices(&state.offered);
        let prompt = entry_select_prompt(kind);
        let text = match lead {
            Some(lead) => format!("{lead}\n\n{prompt}"),
            None => prompt.to_string(),
        };
        self.sessions.insert(actor, Flow::Entry(state));
        Reply::with_choices(text, choices)
    }

    fn onboarding_message(
        &mut self,
        actor: ActorId,
        mut state: OnboardingFlow,
        text: &str,
    ) -> Reply {
        match state.step {
            OnboardingStep::AccountName => {
                let name = text.trim();
                if name.is_empty() {
                    self.sessions.insert(actor, Flow::Onboarding(state));
                    return Reply::text(onboarding_empty_name_text());
                }
                if state.pending.iter().any(|n| n == name) {
                    let reply = Reply::text(onboarding_duplicate_text(name));
                    self.sessions.insert(actor, Flow::Onboarding(state));
                    return reply;
                }
                state.pending.push(name.to_string());
                state.step = OnboardingStep::MoreDecision;
                let reply = Reply::with_choices(account_added_prompt(name), decision_choices());
                self.sessions.insert(actor, Flow::Onboarding(state));
                reply
            }
            OnboardingStep::MoreDecision => {
                self.sessions.insert(actor, Flow::Onboarding(state));
                Reply::with_choices(more_accounts_prompt(), decision_choices())
            }
        }
    }

    fn onboarding_selection(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        mut state: OnboardingFlow,
        data: &str,
    ) -> Reply {
        match state.step {
            OnboardingStep::AccountName => {
                let prompt = if state.pending.is_empty() {
                    first_account_prompt()
                } else {
                    another_account_prompt()
                };
                self.sessions.insert(actor, Flow::Onboarding(state));
                Reply::text(prompt)
            }
            OnboardingStep::MoreDecision => match data {
                "more" => {
                    state.step = OnboardingStep::AccountName;
                    self.sessions.insert(actor, Flow::Onboarding(state));
                    Reply::text(another_account_prompt())
                }
                "done" => {
                    if state.pending.is_empty() {
                        return Reply::text(onboarding_aborted_text());
                    }
                    match ledger.initialize(state.pending.clone()) {
                        Ok(()) => Reply::text(setup_complete_text()),
                        Err(e) => {
                            tracing::error!(error = %e, "failed to write the initial workbook");
                            self.sessions.insert(actor, Flow::Onboarding(state));
                            Reply::text(storage_failure_text())
                        }
                    }
                }
                _ => {
                    self.sessions.insert(actor, Flow::Onboarding(state));
                    Reply::with_choices(more_accounts_prompt(), decision_choices())
                }
            },
        }
    }

    fn rename_message(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        kind: ItemKind,
        step: RenameStep,
        text: &str,
    ) -> Reply {
        match step {
            RenameStep::Selection { offered: _ } => self.offer_rename(ledger, actor, kind, None),
            RenameStep::NewName { current } => {
                let new_name = text.trim().to_string();
                match ledger.rename_item(kind, &current, &new_name) {
                    Ok(touched) => Reply::text(renamed_text(kind, &current, &new_name, touched)),
                    Err(LedgerError::EmptyName) => {
                        let reply = Reply::text(rename_empty_name_text(kind));
                        self.sessions.insert(
                            actor,
                            Flow::RenameItem {
                                kind,
                                step: RenameStep::NewName { current },
                            },
                        );
                        reply
                    }
                    Err(LedgerError::DuplicateName(name)) => {
                        let reply = Reply::text(rename_duplicate_text(kind, &name));
                        self.sessions.insert(
                            actor,
                            Flow::RenameItem {
                                kind,
                                step: RenameStep::NewName { current },
                            },
                        );
                        reply
                    }
                    Err(LedgerError::NotFound(_)) => {
                        Reply::text(edit_not_found_text(kind, &current))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to persist the rename");
                        Reply::text(storage_failure_text())
                    }
                }
            }
        }
    }

    fn rename_selection(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        kind: ItemKind,
        step: RenameStep,
        data: &str,
    ) -> Reply {
        match step {
            RenameStep::Selection { offered } => {
                match pick(&offered, ledger.items(kind), data) {
                    Picked::Live(name) => {
                        let reply = Reply::text(editing_prompt(kind, &name));
                        self.sessions.insert(
                            actor,
                            Flow::RenameItem {
                                kind,
                                step: RenameStep::NewName { current: name },
                            },
                        );
                        reply
                    }
                    Picked::Gone(name) => {
                        let lead = edit_not_found_text(kind, &name);
                        self.offer_rename(ledger, actor, kind, Some(&lead))
                    }
                    Picked::Invalid => {
                        self.offer_rename(ledger, actor, kind, Some(option_gone_text()))
                    }
                }
            }
            RenameStep::NewName { current } => {
                let reply = Reply::text(editing_prompt(kind, &current));
                self.sessions.insert(
                    actor,
                    Flow::RenameItem {
                        kind,
                        step: RenameStep::NewName { current },
                    },
                );
                reply
            }
        }
    }

    fn remove_selection(
        &mut self,
        ledger: &mut Ledger,
        actor: ActorId,
        kind: ItemKind,
        offered: &[String],
        data: &str,
    ) -> Reply {
        match pick(offered, ledger.items(kind), data) {
            Picked::Live(name) => match ledger.remove_item(kind, &name) {
                Ok(touched) => Reply::text(removed_text(kind, &name, touched)),
                Err(LedgerError::LastAccount) => Reply::text(last_account_text()),
                Err(e) => {
                    tracing::error!(error = %e, "failed to persist the removal");
                    Reply::text(storage_failure_text())
                }
            },
            Picked::Gone(name) => {
                let lead = remove_not_found_text(kind, &name);
                self.offer_removal(ledger, actor, kind, Some(&lead))
            }
            Picked::Invalid => self.offer_removal(ledger, actor, kind, Some(option_gone_text())),
        }
    }

    /// Presents the removal list, optionally prefixed with a rejection
    /// notice. With an empty registry no session is (re)created.
    fn offer_removal(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        kind: ItemKind,
        lead: Option<&str>,
    ) -> Reply {
        let names = ledger.items(kind);
        if names.is_empty() {
            return Reply::text(none_to_remove_text(kind));
        }
        let offered = names.to_vec();
        let choices = name_choices(&offered);
        let prompt = remove_select_prompt(kind);
        let text = match lead {
            Some(lead) => format!("{lead}\n\n{prompt}"),
            None => prompt.to_string(),
        };
        self.sessions.insert(actor, Flow::RemoveItem { kind, offered });
        Reply::with_choices(text, choices)
    }

    fn offer_rename(
        &mut self,
        ledger: &Ledger,
        actor: ActorId,
        kind: ItemKind,
        lead: Option<&str>,
    ) -> Reply {
        let names = ledger.items(kind);
        if names.is_empty() {
            return Reply::text(none_to_edit_text(kind));
        }
        let offered = names.to_vec();
        let choices = name_choices(&offered);
        let prompt = edit_select_prompt(kind);
        let text = match lead {
            Some(lead) => format!("{lead}\n\n{prompt}"),
            None => prompt.to_string(),
        };
        self.sessions.insert(
            actor,
            Flow::RenameItem {
                kind,
                step: RenameStep::Selection { offered },
            },
        );
        Reply::with_choices(text, choices)
    }
}

/// Single-message add flow; every outcome ends the session, so this
/// needs no coordinator state.
fn add_item_outcome(ledger: &mut Ledger, kind: ItemKind, text: &str) -> Reply {
    match ledger.add_item(kind, text) {
        Ok(name) => Reply::text(added_text(kind, &name)),
        Err(LedgerError::EmptyName) => Reply::text(empty_name_text(kind)),
        Err(LedgerError::DuplicateName(name)) => Reply::text(already_exists_text(kind, &name)),
        Err(e) => {
            tracing::error!(error = %e, "failed to persist the new item");
            Reply::text(storage_failure_text())
        }
    }
}

enum Picked {
    Live(String),
    Gone(String),
    Invalid,
}

/// Resolves a button token against the offered snapshot, then confirms
/// the name still exists in the live registry.
fn pick(offered: &[String], live: &[String], data: &str) -> Picked {
    let Some(name) = data.parse::<usize>().ok().and_then(|idx| offered.get(idx)) else {
        return Picked::Invalid;
    };
    if live.iter().any(|n| n == name) {
        Picked::Live(name.clone())
    } else {
        Picked::Gone(name.clone())
    }
}

fn name_choices(names: &[String]) -> Vec<Choice> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| Choice {
            label: name.clone(),
            data: idx.to_string(),
        })
        .collect()
}

fn decision_choices() -> Vec<Choice> {
    vec![
        Choice {
            label: "Yes, add another".to_string(),
            data: "more".to_string(),
        },
        Choice {
            label: "No, I'm done".to_string(),
            data: "done".to_string(),
        },
    ]
}

fn setup_gate_text() -> &'static str {
    "Please complete the initial setup first by using the /start command."
}

fn welcome_text() -> &'static str {
    "Welcome to your expense tracker bot! Use /add to add a new expense."
}

fn session_expired_text() -> &'static str {
    "Session expired. Please try again."
}

fn storage_failure_text() -> &'static str {
    "Failed to save your data. Please try again later."
}

fn option_gone_text() -> &'static str {
    "That option is no longer available."
}

fn nothing_to_cancel_text() -> &'static str {
    "Nothing to cancel."
}

fn entry_canceled_text() -> &'static str {
    "Operation canceled."
}

fn entry_name_prompt() -> &'static str {
    "Please enter the name:"
}

fn entry_empty_name_text() -> &'static str {
    "Name cannot be empty. Please enter the name:"
}

fn entry_amount_prompt() -> &'static str {
    "Please enter the amount:"
}

fn invalid_amount_text() -> &'static str {
    "Please enter a valid number for the amount:"
}

fn entry_select_prompt(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Account => "Please select an account:",
        ItemKind::Category => "Please select a category:",
    }
}

fn empty_registry_advice(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Account => "No accounts available. Please use /addaccount to add some first.",
        ItemKind::Category => "No categories available. Please use /addcategory to add some first.",
    }
}

fn entry_summary_text(expense: &Expense) -> String {
    format!(
        "Entry saved successfully!\n\nName: {}\nAccount: {}\nCategory: {}\nAmount: {}",
        expense.name, expense.account, expense.category, expense.amount
    )
}

fn onboarding_welcome_text() -> &'static str {
    "Welcome to your financial tracker! 📊\n\n\
     Let's set up your accounts first. These are the sources of your expenses.\n\n\
     Examples could be: Cash, Bank Account, Credit Card, Savings, etc.\n\n\
     Let's add your first account. What would you like to call it?"
}

fn first_account_prompt() -> &'static str {
    "Let's add your first account. What would you like to call it?"
}

fn another_account_prompt() -> &'static str {
    "Let's add another account. What would you like to call it?"
}

fn onboarding_empty_name_text() -> &'static str {
    "Account name cannot be empty. Please enter a valid name:"
}

fn onboarding_duplicate_text(name: &str) -> String {
    format!("Account '{name}' already exists. Please enter a different name:")
}

fn account_added_prompt(name: &str) -> String {
    format!("Account '{name}' added! Would you like to add another account?")
}

fn more_accounts_prompt() -> &'static str {
    "Would you like to add another account?"
}

fn onboarding_aborted_text() -> &'static str {
    "Onboarding canceled. No accounts were added."
}

fn setup_complete_text() -> &'static str {
    "✅ Setup complete! Your accounts have been saved.\n\n\
     You can now start tracking your expenses with the /add command.\n\n\
     Here are some useful commands:\n\
     /add - Add a new expense\n\
     /accounts - List your accounts\n\
     /categories - List expense categories\n\
     /help - Show all available commands"
}

fn add_prompt(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Account => "What account would you like to add?",
        ItemKind::Category => "What category would you like to add?",
    }
}

fn empty_name_text(kind: ItemKind) -> String {
    format!("{} name cannot be empty.", kind.label())
}

fn already_exists_text(kind: ItemKind, name: &str) -> String {
    format!("{} '{}' already exists.", kind.label(), name)
}

fn added_text(kind: ItemKind, name: &str) -> String {
    format!("{} '{}' added successfully!", kind.label(), name)
}

fn edit_select_prompt(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Account => "Select an account to edit:",
        ItemKind::Category => "Select a category to edit:",
    }
}

fn remove_select_prompt(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Account => "Select an account to remove:",
        ItemKind::Category => "Select a category to remove:",
    }
}

fn none_to_edit_text(kind: ItemKind) -> String {
    format!("No {} to edit.", kind.plural())
}

fn none_to_remove_text(kind: ItemKind) -> String {
    format!("No {} to remove.", kind.plural())
}

fn editing_prompt(kind: ItemKind, name: &str) -> String {
    format!(
        "You are editing {}: '{}'\nPlease enter the new name:",
        kind.noun(),
        name
    )
}

fn rename_empty_name_text(kind: ItemKind) -> String {
    format!("{} name cannot be empty. Please enter the new name:", kind.label())
}

fn rename_duplicate_text(kind: ItemKind, name: &str) -> String {
    format!(
        "{} '{}' already exists. Please enter the new name:",
        kind.label(),
        name
    )
}

fn edit_not_found_text(kind: ItemKind, name: &str) -> String {
    format!("{} '{}' not found.", kind.label(), name)
}

fn remove_not_found_text(kind: ItemKind, name: &str) -> String {
    format!("{} '{}' not found or already removed.", kind.label(), name)
}

fn renamed_text(kind: ItemKind, old: &str, new: &str, touched: usize) -> String {
    let tail = if touched > 0 {
        format!("Updated {touched} existing entries in the expense sheet.")
    } else {
        "No existing entries needed updating.".to_string()
    };
    format!(
        "{} renamed from '{}' to '{}' successfully!\n{}",
        kind.label(),
        old,
        new,
        tail
    )
}

fn removed_text(kind: ItemKind, name: &str, touched: usize) -> String {
    let mut text = format!("{} '{}' has been removed.", kind.label(), name);
    if touched > 0 {
        text.push_str(&format!(
            "\n\nWarning: {} expense entries used this {}. These entries now have '{}' as their {}.",
            touched,
            kind.noun(),
            kind.removal_placeholder(),
            kind.noun()
        ));
    }
    text
}

fn last_account_text() -> &'static str {
    "Cannot remove the last account. You need at least one account."
}
