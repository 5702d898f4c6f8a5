//! Questionnaire flow: questions, per-user sessions, completion tracking,
//! the repeat-/start guard and the engine that ties them together.

pub mod completion;
pub mod engine;
pub mod guard;
pub mod questions;
pub mod session;

pub use completion::CompletionRegistry;
pub use engine::{ConversationEngine, EngineConfig, Outbound};
pub use guard::{AbuseGuard, GuardPolicy, GuardVerdict};
pub use session::SessionStore;
