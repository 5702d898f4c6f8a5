use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;

use anketka::core::{config, init_logger, log_startup_configuration, web_server};
use anketka::onboarding::{
    AbuseGuard, CompletionRegistry, ConversationEngine, EngineConfig, GuardPolicy, SessionStore,
};
use anketka::payments::{DonationConfig, DonationFlow, TransactionLedger};
use anketka::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (logging, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present, before any config
    // static is touched
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;
    log_startup_configuration();

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    // Keep-alive HTTP stub for hosting platforms that ping the container
    let port = *config::KEEP_ALIVE_PORT;
    if port != 0 {
        tokio::spawn(async move {
            if let Err(e) = web_server::start_keep_alive_server(port).await {
                log::error!("Keep-alive server failed: {}", e);
            }
        });
    }

    let ledger = TransactionLedger::new();
    let engine = ConversationEngine::new(
        SessionStore::new(),
        CompletionRegistry::new(),
        AbuseGuard::new(GuardPolicy {
            block_duration: config::guard::block_duration().into(),
            max_attempts: *config::guard::MAX_ATTEMPTS,
        }),
        EngineConfig {
            reveal_block: *config::guard::REVEAL_BLOCK,
            channel_url: config::CHANNEL_URL.clone(),
        },
    );
    let donation = DonationFlow::new(
        ledger.clone(),
        DonationConfig {
            amounts: config::donation::AMOUNTS.to_vec(),
            min_custom: config::donation::MIN_CUSTOM_AMOUNT,
            max_custom: config::donation::MAX_CUSTOM_AMOUNT,
        },
    );
    let deps = HandlerDeps::new(engine, donation, ledger);

    log::info!("🚀 Bot started");

    use teloxide::update_listeners::Polling;
    let listener = Polling::builder(bot.clone()).drop_pending_updates().build();

    Dispatcher::builder(bot, schema(deps))
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}
