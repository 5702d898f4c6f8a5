//! Conversation engine: the questionnaire state machine.
//!
//! Drives `Idle → AwaitingAnswer(step) → Completed` over the injected
//! stores. The engine itself never touches the network: every operation
//! returns a list of [`Outbound`] actions that the Telegram layer renders
//! and sends after all store locks are released.

use teloxide::types::ChatId;

use crate::core::error::AppError;
use crate::onboarding::completion::CompletionRegistry;
use crate::onboarding::guard::{AbuseGuard, GuardVerdict};
use crate::onboarding::questions::{QUESTIONS, Question, validate_answer};
use crate::onboarding::session::SessionStore;

/// Outbound action produced by the engine, rendered by the gateway layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Plain message to the user.
    Text(String),
    /// Message with one-shot reply buttons (the skip label).
    TextWithButtons { text: String, buttons: Vec<String> },
    /// Structured event for the admin notification sink. Delivery is
    /// fire-and-forget; failures never reach the user-facing flow.
    AdminNotify(String),
    /// Call-to-action with the channel link, sent after completion.
    ChannelInvite { url: String },
}

/// Engine policy, injected so tests never read process configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tell a blocked user about the block instead of staying silent.
    pub reveal_block: bool,
    /// Channel link for the post-completion call-to-action. Empty = none.
    pub channel_url: String,
}

#[derive(Clone)]
pub struct ConversationEngine {
    sessions: SessionStore,
    completion: CompletionRegistry,
    guard: AbuseGuard,
    config: EngineConfig,
}

impl ConversationEngine {
    pub fn new(
        sessions: SessionStore,
        completion: CompletionRegistry,
        guard: AbuseGuard,
        config: EngineConfig,
    ) -> Self {
        Self {
            sessions,
            completion,
            guard,
            config,
        }
    }

    /// Handles a /start event.
    ///
    /// A user who already completed the questionnaire never gets a new
    /// session; the event drives the abuse guard instead.
    pub async fn start(&self, user: ChatId) -> Vec<Outbound> {
        if self.completion.contains(user).await {
            return match self.guard.note_repeat(user).await {
                GuardVerdict::Warn { attempts } => {
                    log::info!("Repeat /start from completed user {} (attempt {})", user.0, attempts);
                    vec![Outbound::Text(
                        "Ты уже заполнял анкету — второй раз нельзя.".to_string(),
                    )]
                }
                GuardVerdict::JustBlocked => {
                    log::warn!("User {} hit the repeat-start threshold, blocking", user.0);
                    self.blocked_reply()
                }
                GuardVerdict::StillBlocked => {
                    log::debug!("Dropping /start from blocked user {}", user.0);
                    self.blocked_reply()
                }
            };
        }

        match self.sessions.begin(user).await {
            Ok(()) => {
                log::info!("Questionnaire started for user {}", user.0);
                vec![prompt_for(&QUESTIONS[0])]
            }
            Err(AppError::AlreadyActive) => {
                // Mid-questionnaire /start: repeat the pending question
                // instead of resetting progress.
                let step = self.sessions.get(user).await.map(|s| s.step).unwrap_or(0);
                let question = &QUESTIONS[step.min(QUESTIONS.len() - 1)];
                vec![
                    Outbound::Text("Анкета уже начата, продолжим.".to_string()),
                    prompt_for(question),
                ]
            }
            Err(e) => {
                log::error!("Failed to begin session for user {}: {}", user.0, e);
                Vec::new()
            }
        }
    }

    /// Handles a free-text message while a questionnaire may be in flight.
    pub async fn answer(&self, user: ChatId, text: &str) -> Vec<Outbound> {
        let Some(session) = self.sessions.get(user).await else {
            return vec![Outbound::Text(
                "Чтобы заполнить анкету, нажми /start.".to_string(),
            )];
        };

        let Some(question) = QUESTIONS.get(session.step) else {
            // The final answer is already recorded and completion is in
            // flight; this message lost the race and can be dropped.
            log::debug!("Dropping message from user {} with finished session", user.0);
            return Vec::new();
        };
        let value = match validate_answer(question, text) {
            Ok(v) => v,
            Err(AppError::Validation(reprompt)) => {
                // Same state, same step: just re-ask.
                return vec![Outbound::Text(reprompt)];
            }
            Err(e) => {
                log::error!("Unexpected validation failure for user {}: {}", user.0, e);
                return Vec::new();
            }
        };

        let next_step = match self.sessions.advance(user, question.key, value).await {
            Ok(step) => step,
            Err(AppError::Validation(reprompt)) => {
                // A duplicate answer raced the step forward; ask the
                // now-current question instead of double-advancing.
                log::debug!("Stale answer from user {}, re-prompting", user.0);
                return vec![Outbound::Text(reprompt)];
            }
            Err(e) => {
                // Session vanished between get and advance (abandon race);
                // treat it like no session.
                log::warn!("Advance failed for user {}: {}", user.0, e);
                return vec![Outbound::Text(
                    "Чтобы заполнить анкету, нажми /start.".to_string(),
                )];
            }
        };

        if next_step < QUESTIONS.len() {
            return vec![prompt_for(&QUESTIONS[next_step])];
        }

        self.finalize(user).await
    }

    /// Final-answer path: destroy the session, mark completion, emit the
    /// summary, the admin notification and the call-to-action.
    async fn finalize(&self, user: ChatId) -> Vec<Outbound> {
        let answers = match self.sessions.complete(user).await {
            Ok(a) => a,
            Err(e) => {
                log::error!("Failed to finalize session for user {}: {}", user.0, e);
                return Vec::new();
            }
        };

        if !self.completion.mark(user).await {
            log::warn!("User {} completed the questionnaire twice", user.0);
        }
        log::info!("Questionnaire completed by user {}", user.0);

        let lines: Vec<String> = answers
            .iter()
            .map(|(key, value)| format!("{}: {}", key.label(), value))
            .collect();

        let mut out = vec![
            Outbound::Text(format!("Анкета заполнена! Вот что получилось:\n\n{}", lines.join("\n"))),
            Outbound::AdminNotify(format!("Новая анкета\nuser_id: {}\n{}", user.0, lines.join("\n"))),
        ];
        if !self.config.channel_url.is_empty() {
            out.push(Outbound::ChannelInvite {
                url: self.config.channel_url.clone(),
            });
        }
        out
    }

    fn blocked_reply(&self) -> Vec<Outbound> {
        if self.config.reveal_block {
            vec![Outbound::Text(
                "Слишком много попыток — подожди немного и попробуй снова.".to_string(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Builds the prompt action for a question, with the skip button when the
/// question allows skipping.
fn prompt_for(question: &Question) -> Outbound {
    match question.skip_label {
        Some(label) if question.skippable => Outbound::TextWithButtons {
            text: question.prompt.to_string(),
            buttons: vec![label.to_string()],
        },
        _ => Outbound::Text(question.prompt.to_string()),
    }
}
