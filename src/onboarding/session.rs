//! Per-user questionnaire session store.
//!
//! Holds the in-flight progress of every user currently answering the
//! questionnaire. All operations are keyed by `ChatId`; the single map
//! mutex serializes mutations for the same user, and it is never held
//! across an outbound send.

use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::core::error::{AppError, AppResult};
use crate::onboarding::questions::{QUESTIONS, QuestionKey};

/// In-flight questionnaire progress for one user.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Index into `QUESTIONS` of the question currently awaiting an answer.
    /// Only ever increases; equals `QUESTIONS.len()` right before completion.
    pub step: usize,
    /// Answers collected so far, in question order.
    pub answers: Vec<(QuestionKey, String)>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            step: 0,
            answers: Vec::with_capacity(QUESTIONS.len()),
        }
    }
}

/// Keyed store of active sessions. At most one session per user.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ChatId, SessionState>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session at step 0.
    ///
    /// Fails with `AlreadyActive` if the user already has one in flight,
    /// so rapid repeated /start events can never produce duplicates.
    pub async fn begin(&self, user: ChatId) -> AppResult<()> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&user) {
            return Err(AppError::AlreadyActive);
        }
        sessions.insert(user, SessionState::new());
        Ok(())
    }

    /// Returns a snapshot of the user's session, if any.
    pub async fn get(&self, user: ChatId) -> Option<SessionState> {
        self.sessions.lock().await.get(&user).cloned()
    }

    /// Records a validated answer and advances the step by one.
    ///
    /// Returns the new step index. The caller is responsible for having
    /// validated `value` against the question at the current step.
    ///
    /// `key` must match the question currently awaiting an answer. The
    /// check runs under the same lock as the mutation, so a duplicate
    /// answer that raced in between the caller's `get` and this call
    /// cannot double-advance: it fails with a `Validation` error carrying
    /// the now-current prompt.
    pub async fn advance(&self, user: ChatId, key: QuestionKey, value: String) -> AppResult<usize> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(&user).ok_or(AppError::NoActiveSession)?;
        match QUESTIONS.get(session.step) {
            Some(question) if question.key == key => {}
            Some(question) => return Err(AppError::Validation(question.prompt.to_string())),
            // All answers already recorded; completion is in flight.
            None => return Err(AppError::NoActiveSession),
        }
        session.answers.push((key, value));
        session.step += 1;
        Ok(session.step)
    }

    /// Destroys the session and returns the finalized answers.
    ///
    /// The only regular way a session ends; `abandon` covers the explicit
    /// cancel path.
    pub async fn complete(&self, user: ChatId) -> AppResult<Vec<(QuestionKey, String)>> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.remove(&user).ok_or(AppError::NoActiveSession)?;
        Ok(session.answers)
    }

    /// Drops the session without finalizing it.
    pub async fn abandon(&self, user: ChatId) {
        self.sessions.lock().await.remove(&user);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ChatId = ChatId(1001);

    #[tokio::test]
    async fn test_begin_creates_single_session() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();
        assert!(matches!(store.begin(USER).await, Err(AppError::AlreadyActive)));

        let session = store.get(USER).await.unwrap();
        assert_eq!(session.step, 0);
        assert!(session.answers.is_empty());
    }

    #[tokio::test]
    async fn test_advance_bumps_step_and_records_answer() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();

        let step = store.advance(USER, QuestionKey::Name, "Вася".to_string()).await.unwrap();
        assert_eq!(step, 1);

        let session = store.get(USER).await.unwrap();
        assert_eq!(session.answers, vec![(QuestionKey::Name, "Вася".to_string())]);
    }

    #[tokio::test]
    async fn test_advance_without_session_fails() {
        let store = SessionStore::new();
        let result = store.advance(USER, QuestionKey::Name, "x".to_string()).await;
        assert!(matches!(result, Err(AppError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_advance_with_stale_key_does_not_double_advance() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();
        store.advance(USER, QuestionKey::Name, "Вася".to_string()).await.unwrap();

        // A duplicate answer for the name question arrives after the step
        // already moved on to age.
        let result = store.advance(USER, QuestionKey::Name, "Вася".to_string()).await;
        assert!(matches!(result, Err(AppError::Validation(prompt)) if prompt.contains("лет")));

        let session = store.get(USER).await.unwrap();
        assert_eq!(session.step, 1);
        assert_eq!(session.answers.len(), 1);
    }

    #[tokio::test]
    async fn test_advance_past_final_question_fails() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();
        store.advance(USER, QuestionKey::Name, "Вася".to_string()).await.unwrap();
        store.advance(USER, QuestionKey::Age, "25".to_string()).await.unwrap();
        store.advance(USER, QuestionKey::Skill, "Rust".to_string()).await.unwrap();

        let result = store.advance(USER, QuestionKey::Skill, "Rust".to_string()).await;
        assert!(matches!(result, Err(AppError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_complete_destroys_session() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();
        store.advance(USER, QuestionKey::Name, "Вася".to_string()).await.unwrap();
        store.advance(USER, QuestionKey::Age, "25".to_string()).await.unwrap();

        let answers = store.complete(USER).await.unwrap();
        assert_eq!(answers.len(), 2);
        assert!(store.get(USER).await.is_none());
        assert!(matches!(store.complete(USER).await, Err(AppError::NoActiveSession)));
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let store = SessionStore::new();
        let other = ChatId(2002);
        store.begin(USER).await.unwrap();
        store.begin(other).await.unwrap();
        store.advance(USER, QuestionKey::Name, "a".to_string()).await.unwrap();

        assert_eq!(store.get(USER).await.unwrap().step, 1);
        assert_eq!(store.get(other).await.unwrap().step, 0);
    }

    #[tokio::test]
    async fn test_abandon_removes_session() {
        let store = SessionStore::new();
        store.begin(USER).await.unwrap();
        store.abandon(USER).await;
        assert!(store.get(USER).await.is_none());
        // A new session can start after abandonment.
        store.begin(USER).await.unwrap();
    }
}
