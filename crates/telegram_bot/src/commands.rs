//! Command declarations.

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub(crate) enum Command {
    #[command(description = "Start the bot and run the first-time setup.")]
    Start,
    #[command(description = "Show all available commands.")]
    Help,
    #[command(description = "Cancel the current operation.")]
    Cancel,
    #[command(description = "Add a new expense.")]
    Add,
    #[command(description = "List your accounts.")]
    Accounts,
    #[command(description = "Add a new account.")]
    AddAccount,
    #[command(description = "Remove an account.")]
    RemoveAccount,
    #[command(description = "Rename an account.")]
    EditAccount,
    #[command(description = "List expense categories.")]
    Categories,
    #[command(description = "Add a new category.")]
    AddCategory,
    #[command(description = "Remove a category.")]
    RemoveCategory,
    #[command(description = "Rename a category.")]
    EditCategory,
}
