//! Operator-only refund command.
//!
//! `/refund <tx-id>` is hidden: it is not in the Command enum and non-admin
//! callers get no reply at all, so the command's existence is not leaked.

use teloxide::prelude::*;
use teloxide::types::TelegramTransactionId;

use crate::core::config;
use crate::core::error::AppError;
use crate::payments::{TransactionLedger, TransactionStatus};
use crate::telegram::notifications;

/// Handles `/refund <tx-id>` from an operator.
pub async fn handle_refund_command(
    bot: &Bot,
    ledger: &TransactionLedger,
    msg: &Message,
) -> ResponseResult<()> {
    let caller_id = msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok()).unwrap_or(0);
    if !config::admin::is_admin(caller_id) {
        log::warn!("Ignoring /refund from non-admin {}", caller_id);
        return Ok(());
    }

    let text = msg.text().unwrap_or_default();
    let Some(tx_id) = text.split_whitespace().nth(1) else {
        bot.send_message(msg.chat.id, "Использование: /refund <id транзакции>").await?;
        return Ok(());
    };

    let tx = match ledger.lookup(tx_id) {
        Some(tx) => tx,
        None => {
            bot.send_message(msg.chat.id, format!("Транзакция {} не найдена.", tx_id)).await?;
            return Ok(());
        }
    };

    let Some(charge_id) = tx.charge_id.clone() else {
        // Pending entries have nothing to refund yet.
        debug_assert_eq!(tx.status, TransactionStatus::Pending);
        bot.send_message(
            msg.chat.id,
            format!("Транзакция {} ещё не оплачена, возвращать нечего.", tx_id),
        )
        .await?;
        return Ok(());
    };

    if let Err(e) = bot
        .refund_star_payment(tx.user, TelegramTransactionId(charge_id))
        .await
    {
        log::error!("Star refund failed for {}: {}", tx_id, e);
        bot.send_message(msg.chat.id, format!("Возврат не прошёл: {}", e)).await?;
        return Ok(());
    }

    // Bot API call succeeded; drop the bookkeeping record.
    match ledger.refund(tx_id) {
        Ok(refunded) => {
            log::info!("Refunded {} ({} ⭐) to user {}", refunded.id, refunded.amount, refunded.user.0);
            bot.send_message(
                msg.chat.id,
                format!("Возврат {} ⭐ по транзакции {} выполнен.", refunded.amount, refunded.id),
            )
            .await?;
            // Best-effort notice to the payer.
            if let Err(e) = bot
                .send_message(
                    ChatId(refunded.user.0 as i64),
                    format!("Тебе вернули {} ⭐ за донат.", refunded.amount),
                )
                .await
            {
                log::error!("Failed to notify payer {} about refund: {}", refunded.user.0, e);
            }
            notifications::notify_admins_detached(
                bot,
                format!("Возврат {} ⭐\ntx: {}\nuser: {}", refunded.amount, refunded.id, refunded.user.0),
            );
        }
        Err(AppError::TransactionNotFound(_)) => {
            // Concurrent refund of the same id; the money already moved once.
            log::warn!("Transaction {} vanished between lookup and refund", tx_id);
            bot.send_message(msg.chat.id, format!("Транзакция {} уже возвращена.", tx_id)).await?;
        }
        Err(e) => {
            log::error!("Ledger refund failed for {}: {}", tx_id, e);
        }
    }

    Ok(())
}
