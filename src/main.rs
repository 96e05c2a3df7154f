use std::sync::Arc;

use contact_book_bot::channels::TelegramChannel;
use contact_book_bot::config::BotConfig;
use contact_book_bot::dispatch::{CallbackDispatcher, MessageDispatcher};
use contact_book_bot::store::{ContactStore, EditStateStore, LibSqlBackend};
use contact_book_bot::worker::UpdateListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env()?;

    eprintln!("📇 Contact Book Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());

    let backend = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    let contacts: Arc<dyn ContactStore> = backend.clone();
    let states: Arc<dyn EditStateStore> = backend;

    let channel = Arc::new(TelegramChannel::new(
        config.bot_token.clone(),
        config.poll_timeout_secs,
    ));
    channel.health_check().await?;
    eprintln!("   Telegram: connected\n");

    let listener = UpdateListener::new(
        MessageDispatcher::new(channel.clone(), contacts.clone(), states.clone()),
        CallbackDispatcher::new(channel.clone(), contacts, states),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received");
            let _ = shutdown_tx.send(true);
        }
    });

    let events = channel.start();
    listener.run(events, shutdown_rx).await;

    Ok(())
}
