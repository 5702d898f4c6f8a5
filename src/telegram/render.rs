//! Turns engine and donation actions into Telegram sends.
//!
//! This is the only place that knows how an action maps onto the Bot API:
//! messages, inline keyboards, invoices. Store locks are already released
//! by the time an action reaches this module.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, LabeledPrice};
use url::Url;

use crate::core::config;
use crate::onboarding::Outbound;
use crate::payments::DonationAction;
use crate::telegram::notifications;

/// Callback-data prefix for inline buttons that answer a questionnaire
/// question (currently only the skip button). The label after the prefix
/// is fed back into the engine as if the user had typed it.
pub const ANSWER_CALLBACK_PREFIX: &str = "onboard:answer:";

/// Sends the engine's actions to the user (and the admin sink).
pub async fn send_outbound(bot: &Bot, chat_id: ChatId, actions: Vec<Outbound>) -> ResponseResult<()> {
    for action in actions {
        match action {
            Outbound::Text(text) => {
                bot.send_message(chat_id, text).await?;
            }
            Outbound::TextWithButtons { text, buttons } => {
                let rows: Vec<Vec<InlineKeyboardButton>> = buttons
                    .into_iter()
                    .map(|label| {
                        let data = format!("{}{}", ANSWER_CALLBACK_PREFIX, label);
                        vec![InlineKeyboardButton::callback(label, data)]
                    })
                    .collect();
                bot.send_message(chat_id, text)
                    .reply_markup(InlineKeyboardMarkup::new(rows))
                    .await?;
            }
            Outbound::AdminNotify(text) => {
                notifications::notify_admins_detached(bot, text);
            }
            Outbound::ChannelInvite { url } => {
                match url.parse::<Url>() {
                    Ok(parsed) => {
                        let keyboard = InlineKeyboardMarkup::new(vec![vec![
                            InlineKeyboardButton::url("Перейти в канал", parsed),
                        ]]);
                        bot.send_message(chat_id, "Подпишись на наш канал:")
                            .reply_markup(keyboard)
                            .await?;
                    }
                    Err(e) => {
                        // A malformed CHANNEL_URL should not kill the
                        // completion flow.
                        log::error!("Invalid CHANNEL_URL {}: {}", url, e);
                        bot.send_message(chat_id, format!("Подпишись на наш канал: {}", url))
                            .await?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Sends the donation flow's actions to the user (and the admin sink).
pub async fn send_donation(bot: &Bot, chat_id: ChatId, actions: Vec<DonationAction>) -> ResponseResult<()> {
    for action in actions {
        match action {
            DonationAction::Text(text) => {
                bot.send_message(chat_id, text).await?;
            }
            DonationAction::Menu { text, buttons } => {
                let rows: Vec<Vec<InlineKeyboardButton>> = buttons
                    .into_iter()
                    .map(|row| {
                        row.into_iter()
                            .map(|(label, data)| InlineKeyboardButton::callback(label, data))
                            .collect()
                    })
                    .collect();
                bot.send_message(chat_id, text)
                    .reply_markup(InlineKeyboardMarkup::new(rows))
                    .await?;
            }
            DonationAction::Invoice {
                title,
                description,
                payload,
                amount,
            } => {
                // XTR invoices carry no provider token; the price label is
                // purely cosmetic in the Stars UI.
                bot.send_invoice(
                    chat_id,
                    title.clone(),
                    description,
                    payload,
                    config::donation::CURRENCY.clone(),
                    vec![LabeledPrice::new(title, amount)],
                )
                .await?;
            }
            DonationAction::AdminNotify(text) => {
                notifications::notify_admins_detached(bot, text);
            }
        }
    }
    Ok(())
}
