//! Telegram bot.
//!
//! The bot is a thin transport: it translates incoming updates into
//! ledger flow events and renders the returned replies. Every rule about
//! accounts, categories and expenses lives in the `ledger` crate.

use std::path::PathBuf;

use ledger::SessionCoordinator;
use teloxide::prelude::*;

use crate::state::StateStore;

mod commands;
mod handlers;
mod state;
mod ui;

#[derive(Clone)]
pub struct ConfigParameters {
    authorized_user: UserId,
    state: StateStore,
}

pub struct Bot {
    token: String,
    authorized_user: UserId,
    workbook_path: Option<PathBuf>,
}

impl Bot {
    pub fn new(token: &str, authorized_user: UserId, workbook_path: Option<PathBuf>) -> Self {
        Self {
            token: token.to_string(),
            authorized_user,
            workbook_path,
        }
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    /// Run the telegram bot.
    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let mut ledger = ledger::Ledger::builder();
        if let Some(path) = &self.workbook_path {
            ledger = ledger.workbook_path(path);
        }
        let ledger = ledger.build();
        tracing::info!(
            path = %ledger.workbook_path().display(),
            first_run = ledger.is_first_run(),
            "Workbook loaded"
        );

        let sessions = SessionCoordinator::new(self.authorized_user.0);
        let parameters = ConfigParameters {
            authorized_user: self.authorized_user,
            state: StateStore::new(ledger, sessions),
        };

        let handler = dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<commands::Command>()
                    .endpoint(handlers::handle_command),
            )
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    authorized_user: Option<UserId>,
    workbook_path: Option<PathBuf>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn authorized_user(mut self, user_id: u64) -> BotBuilder {
        self.authorized_user = Some(UserId(user_id));
        self
    }

    pub fn workbook_path(mut self, path: impl Into<PathBuf>) -> BotBuilder {
        self.workbook_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("telegram token is required".to_string());
        }
        let Some(authorized_user) = self.authorized_user else {
            return Err("authorized user id is required".to_string());
        };
        Ok(Bot::new(&self.token, authorized_user, self.workbook_path))
    }
}
