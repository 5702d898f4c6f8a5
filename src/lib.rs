//! Anketka - Telegram bot combining an onboarding questionnaire with a
//! Stars donation flow.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and the keep-alive HTTP stub
//! - `onboarding`: questionnaire sessions, completion tracking, abuse guard
//!   and the conversation engine
//! - `payments`: donation transaction ledger and the menu-driven flow
//! - `telegram`: bot setup, dispatcher schema and action rendering

pub mod core;
pub mod onboarding;
pub mod payments;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult};
pub use onboarding::{AbuseGuard, CompletionRegistry, ConversationEngine, SessionStore};
pub use payments::{DonationFlow, TransactionLedger};
pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
