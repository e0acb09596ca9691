mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "contabot={level},telegram_bot={level},ledger={level}",
            level = settings.app.level
        ))
        .init();

    let telegram = settings.telegram;
    tracing::info!("Found telegram settings...");
    let mut builder = telegram_bot::Bot::builder()
        .token(&telegram.token)
        .authorized_user(telegram.allowed_user);
    if let Some(workbook) = telegram.workbook {
        builder = builder.workbook_path(workbook);
    }
    let bot = builder.build()?;
    bot.run().await;

    Ok(())
}
