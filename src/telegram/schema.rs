//! Telegram bot handler tree configuration
//!
//! This module provides the main dispatcher schema for the bot. Branch
//! order matters: the successful-payment branch must run before the
//! generic message branch, and hidden operator commands are matched by a
//! raw text prefix because they are not in the Command enum.

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{Message, PreCheckoutQuery};
use teloxide::utils::command::BotCommands;

use crate::onboarding::ConversationEngine;
use crate::payments::{DonationFlow, TransactionLedger};
use crate::telegram::admin;
use crate::telegram::bot::Command;
use crate::telegram::render;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub engine: ConversationEngine,
    pub donation: DonationFlow,
    pub ledger: TransactionLedger,
}

impl HandlerDeps {
    pub fn new(engine: ConversationEngine, donation: DonationFlow, ledger: TransactionLedger) -> Self {
        Self {
            engine,
            donation,
            ledger,
        }
    }
}

/// Builds the full handler tree.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_payment = deps.clone();
    let deps_refund = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps.clone();
    let deps_callback = deps;

    dptree::entry()
        // Successful payment handler must run FIRST: a payment message also
        // carries no text and must never fall through to other branches
        .branch(successful_payment_handler(deps_payment))
        // Hidden operator command (not in Command enum)
        .branch(refund_handler(deps_refund))
        // Command handler
        .branch(command_handler(deps_commands))
        // Free-text handler: custom donation amounts and questionnaire answers
        .branch(message_handler(deps_messages))
        // Pre-checkout query handler
        .branch(pre_checkout_handler())
        // Callback query handler
        .branch(callback_handler(deps_callback))
}

/// Handler for successful Telegram Stars payments
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let Some(payment) = msg.successful_payment() else {
                    return Ok(());
                };
                log::info!(
                    "💳 Successful payment: {} {} payload={} charge={}",
                    payment.total_amount,
                    payment.currency,
                    payment.invoice_payload,
                    payment.telegram_payment_charge_id.0
                );

                let user = msg
                    .from
                    .as_ref()
                    .map(|u| u.id)
                    .unwrap_or(UserId(msg.chat.id.0.unsigned_abs()));
                let amount = u32::try_from(payment.total_amount).unwrap_or(0);
                let actions = deps.donation.on_successful_payment(
                    user,
                    &payment.invoice_payload,
                    amount,
                    &payment.telegram_payment_charge_id.0,
                );
                render::send_donation(&bot, msg.chat.id, actions).await?;
                Ok(())
            }
        })
}

/// True for `/refund` and `/refund <args>`, but not for other commands
/// that merely share the prefix.
fn is_refund_command(text: &str) -> bool {
    text.split_whitespace().next() == Some("/refund")
}

/// Handler for the hidden /refund operator command
fn refund_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(is_refund_command).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                admin::handle_refund_command(&bot, &deps.ledger, &msg).await?;
                Ok(())
            }
        })
}

/// Handler for the public commands
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                match cmd {
                    Command::Start => {
                        let actions = deps.engine.start(msg.chat.id).await;
                        render::send_outbound(&bot, msg.chat.id, actions).await?;
                    }
                    Command::Donate => {
                        render::send_donation(&bot, msg.chat.id, vec![deps.donation.root_menu()]).await?;
                    }
                    Command::Help => {
                        bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for free-text messages
///
/// The donation flow gets the first look (a user may be typing a custom
/// amount); everything else is routed to the questionnaire engine.
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();
                if text.starts_with('/') {
                    // Unknown command, not questionnaire input.
                    log::debug!("Ignoring unknown command from {}: {}", msg.chat.id.0, text);
                    return Ok(());
                }

                if let Some(user) = msg.from.as_ref().map(|u| u.id) {
                    if let Some(actions) = deps.donation.on_text(user, text).await {
                        render::send_donation(&bot, msg.chat.id, actions).await?;
                        return Ok(());
                    }
                }

                let actions = deps.engine.answer(msg.chat.id, text).await;
                render::send_outbound(&bot, msg.chat.id, actions).await?;
                Ok(())
            }
        })
}

/// Handler for pre-checkout queries
///
/// Always approves: there is no stock or fraud check for donations.
fn pre_checkout_handler() -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(|bot: Bot, query: PreCheckoutQuery| async move {
        log::info!(
            "Pre-checkout query from {}: payload={}",
            query.from.id.0,
            query.invoice_payload
        );
        if let Err(e) = bot.answer_pre_checkout_query(query.id, true).await {
            log::error!("Failed to answer pre_checkout_query: {:?}", e);
        }
        Ok(())
    })
}

/// Handler for inline-button presses
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            let Some(data) = q.data.clone() else {
                return Ok(());
            };
            // Stop the button spinner regardless of what the press does.
            if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                log::error!("Failed to answer callback query: {}", e);
            }
            let Some(chat_id) = q.message.as_ref().map(|m| m.chat().id) else {
                return Ok(());
            };

            if let Some(label) = data.strip_prefix(render::ANSWER_CALLBACK_PREFIX) {
                let actions = deps.engine.answer(chat_id, label).await;
                render::send_outbound(&bot, chat_id, actions).await?;
            } else if data.starts_with("donate:") {
                let actions = deps.donation.on_callback(q.from.id, &data).await;
                render::send_donation(&bot, chat_id, actions).await?;
            } else {
                log::debug!("Ignoring unknown callback data: {}", data);
            }
            Ok(())
        }
    })
}
