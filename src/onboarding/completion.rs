//! Registry of users who have finished the questionnaire.
//!
//! Append-only for the process lifetime: completion never expires and there
//! is no reset operation. Membership is checked before any new session is
//! allowed to start.

use std::collections::HashSet;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct CompletionRegistry {
    completed: Arc<Mutex<HashSet<ChatId>>>,
}

impl CompletionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completion. Returns false if the user was already marked,
    /// which makes double-completion observable at the call site.
    pub async fn mark(&self, user: ChatId) -> bool {
        self.completed.lock().await.insert(user)
    }

    pub async fn contains(&self, user: ChatId) -> bool {
        self.completed.lock().await.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_is_exactly_once() {
        let registry = CompletionRegistry::new();
        let user = ChatId(7);

        assert!(!registry.contains(user).await);
        assert!(registry.mark(user).await);
        assert!(registry.contains(user).await);
        // Second mark reports the duplicate.
        assert!(!registry.mark(user).await);
    }

    #[tokio::test]
    async fn test_membership_is_per_user() {
        let registry = CompletionRegistry::new();
        registry.mark(ChatId(1)).await;
        assert!(!registry.contains(ChatId(2)).await);
    }
}
