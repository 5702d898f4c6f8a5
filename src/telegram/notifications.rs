//! Fire-and-forget admin notification sink.
//!
//! Submission summaries, donation receipts and refund notices go to every
//! configured admin id. Delivery failures are logged and swallowed; they
//! never reach the user-facing flow.

use teloxide::prelude::*;

use crate::core::config;

/// Returns every configured admin chat id, deduplicated.
fn admin_chat_ids() -> Vec<ChatId> {
    let mut ids = config::admin::ADMIN_IDS.clone();
    let primary = *config::admin::ADMIN_USER_ID;
    if primary != 0 && !ids.contains(&primary) {
        ids.push(primary);
    }
    ids.into_iter().map(ChatId).collect()
}

/// Sends a plain text notification to all configured admins.
pub async fn notify_admins(bot: &Bot, text: &str) {
    let ids = admin_chat_ids();
    if ids.is_empty() {
        log::debug!("No admins configured, dropping notification: {}", text);
        return;
    }
    for chat_id in ids {
        if let Err(e) = bot.send_message(chat_id, text).await {
            log::error!("Failed to notify admin {}: {}", chat_id.0, e);
        }
    }
}

/// Spawned variant for call sites that must not wait on the sink.
pub fn notify_admins_detached(bot: &Bot, text: String) {
    let bot = bot.clone();
    tokio::spawn(async move {
        notify_admins(&bot, &text).await;
    });
}
