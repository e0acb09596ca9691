use crate::{expense::Expense, money::MoneyCents, registry::ItemKind};

/// Chat-platform user id, as delivered by the transport.
pub type ActorId = u64;

/// One tappable option attached to a [`Reply`]. `data` is the token the
/// transport must echo back on selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub data: String,
}

/// What the ledger wants shown to the user after handling an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<Choice>,
}

impl Reply {
    pub(crate) fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub(crate) fn with_choices(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            text: text.into(),
            choices,
        }
    }
}

/// The flows a transport can start. Carries only what `begin` needs; the
/// per-step state lives in [`Flow`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowKind {
    Entry,
    Onboarding,
    AddItem(ItemKind),
    RenameItem(ItemKind),
    RemoveItem(ItemKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryStep {
    Name,
    Account,
    Category,
    Amount,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct EntryDraft {
    pub name: Option<String>,
    pub account: Option<String>,
    pub category: Option<String>,
}

impl EntryDraft {
    pub(crate) fn into_expense(self, amount: MoneyCents) -> Expense {
        Expense {
            name: self.name.unwrap_or_else(|| "Unknown".to_string()),
            account: self.account.unwrap_or_else(|| "Unknown".to_string()),
            category: self.category.unwrap_or_else(|| "Unknown".to_string()),
            amount,
        }
    }
}

/// Guided expense entry. `offered` is the snapshot behind the buttons of
/// the current selection step, so callback tokens stay resolvable even
/// after the registry changes underneath.
#[derive(Clone, Debug)]
pub(crate) struct EntryFlow {
    pub step: EntryStep,
    pub draft: EntryDraft,
    pub offered: Vec<String>,
}

impl EntryFlow {
    pub(crate) fn new() -> Self {
        Self {
            step: EntryStep::Name,
            draft: EntryDraft::default(),
            offered: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OnboardingStep {
    AccountName,
    MoreDecision,
}

/// First-run account collection. Names pile up in `pending` and only hit
/// the workbook on completion.
#[derive(Clone, Debug)]
pub(crate) struct OnboardingFlow {
    pub step: OnboardingStep,
    pub pending: Vec<String>,
}

impl OnboardingFlow {
    pub(crate) fn new() -> Self {
        Self {
            step: OnboardingStep::AccountName,
            pending: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum RenameStep {
    Selection { offered: Vec<String> },
    NewName { current: String },
}

#[derive(Clone, Debug)]
pub(crate) enum Flow {
    Entry(EntryFlow),
    Onboarding(OnboardingFlow),
    AddItem { kind: ItemKind },
    RenameItem { kind: ItemKind, step: RenameStep },
    RemoveItem { kind: ItemKind, offered: Vec<String> },
}
