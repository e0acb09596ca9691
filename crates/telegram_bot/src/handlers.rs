use ledger::{FlowKind, ItemKind, Reply};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, User},
    utils::command::BotCommands,
};

use crate::{ConfigParameters, commands::Command, ui};

pub(crate) async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id;
    if !is_allowed(&cfg, msg.from.as_ref()) {
        bot.send_message(chat_id, unauthorized_text()).await?;
        return Ok(());
    }
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let actor = from.id.0;

    match cmd {
        // First run goes into onboarding; afterwards /start just greets.
        Command::Start => begin_flow(&bot, chat_id, actor, &cfg, FlowKind::Onboarding).await?,
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
        Command::Cancel => {
            let Ok(reply) = cfg.state.with(|s| s.sessions.cancel(actor)).await else {
                return Ok(());
            };
            send_reply(&bot, chat_id, reply).await?;
        }
        Command::Add => begin_flow(&bot, chat_id, actor, &cfg, FlowKind::Entry).await?,
        Command::Accounts => send_listing(&bot, chat_id, &cfg, ItemKind::Account).await?,
        Command::AddAccount => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::AddItem(ItemKind::Account)).await?;
        }
        Command::RemoveAccount => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::RemoveItem(ItemKind::Account)).await?;
        }
        Command::EditAccount => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::RenameItem(ItemKind::Account)).await?;
        }
        Command::Categories => send_listing(&bot, chat_id, &cfg, ItemKind::Category).await?,
        Command::AddCategory => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::AddItem(ItemKind::Category)).await?;
        }
        Command::RemoveCategory => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::RemoveItem(ItemKind::Category)).await?;
        }
        Command::EditCategory => {
            begin_flow(&bot, chat_id, actor, &cfg, FlowKind::RenameItem(ItemKind::Category)).await?;
        }
    }

    Ok(())
}

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let actor = from.id.0;

    let Some(text) = msg.text() else {
        return Ok(());
    };
    // Unrecognized commands are not session input.
    if text.trim_start().starts_with('/') {
        return Ok(());
    }

    let Ok(outcome) = cfg
        .state
        .with(|s| s.sessions.on_message(&mut s.ledger, actor, text))
        .await
    else {
        return Ok(());
    };
    // No session in progress, nothing to say.
    let Some(reply) = outcome else {
        return Ok(());
    };
    send_reply(&bot, msg.chat.id, reply).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }

    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;
    let actor = q.from.id.0;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data.as_deref() else {
        return Ok(());
    };
    let Some(token) = data.strip_prefix("pick:") else {
        return Ok(());
    };

    let Ok(reply) = cfg
        .state
        .with(|s| s.sessions.on_selection(&mut s.ledger, actor, token))
        .await
    else {
        return Ok(());
    };
    send_reply(&bot, chat_id, reply).await
}

async fn begin_flow(
    bot: &Bot,
    chat_id: ChatId,
    actor: u64,
    cfg: &ConfigParameters,
    kind: FlowKind,
) -> ResponseResult<()> {
    let Ok(reply) = cfg
        .state
        .with(|s| s.sessions.begin(&s.ledger, actor, kind))
        .await
    else {
        return Ok(());
    };
    send_reply(bot, chat_id, reply).await
}

async fn send_listing(
    bot: &Bot,
    chat_id: ChatId,
    cfg: &ConfigParameters,
    kind: ItemKind,
) -> ResponseResult<()> {
    let text = cfg
        .state
        .with(|s| {
            if s.ledger.is_first_run() {
                setup_gate_text().to_string()
            } else {
                ui::render_listing(kind, s.ledger.items(kind))
            }
        })
        .await;
    bot.send_message(chat_id, text).await?;
    Ok(())
}

async fn send_reply(bot: &Bot, chat_id: ChatId, reply: Reply) -> ResponseResult<()> {
    if reply.choices.is_empty() {
        bot.send_message(chat_id, reply.text).await?;
    } else {
        bot.send_message(chat_id, reply.text)
            .reply_markup(ui::keyboard(&reply.choices))
            .await?;
    }
    Ok(())
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    from.id == cfg.authorized_user
}

fn unauthorized_text() -> &'static str {
    "Sorry, you're not authorized to use this bot."
}

fn setup_gate_text() -> &'static str {
    "Please complete the initial setup first by using the /start command."
}
