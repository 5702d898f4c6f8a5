//! Abuse guard: throttles users who keep hitting /start after they have
//! already completed the questionnaire.
//!
//! Each repeat attempt bumps a per-user counter; at the configured
//! threshold the user is blocked for a fixed window. Expiry is evaluated
//! lazily on the next access, there is no background timer. The block is
//! time-boxed, never permanent.

use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Per-user attempt tracking. Created lazily on the first repeat attempt.
#[derive(Debug, Clone)]
struct BlockRecord {
    attempts: u32,
    blocked_until: Option<Instant>,
}

/// Outcome of one repeat-/start attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Attempt counted, user not blocked yet. Carries the running count.
    Warn { attempts: u32 },
    /// This attempt crossed the threshold; the block window starts now.
    JustBlocked,
    /// The user is inside an active block window.
    StillBlocked,
}

/// Policy knobs, injected so tests never touch process configuration.
#[derive(Debug, Clone, Copy)]
pub struct GuardPolicy {
    pub block_duration: Duration,
    pub max_attempts: u32,
}

#[derive(Clone)]
pub struct AbuseGuard {
    records: Arc<Mutex<HashMap<ChatId, BlockRecord>>>,
    policy: GuardPolicy,
}

impl AbuseGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            policy,
        }
    }

    /// Records one repeat attempt and returns the verdict.
    ///
    /// An expired block window resets the record to zero before this
    /// attempt is counted, so the count restarts at 1 after a block.
    pub async fn note_repeat(&self, user: ChatId) -> GuardVerdict {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let record = records.entry(user).or_insert(BlockRecord {
            attempts: 0,
            blocked_until: None,
        });

        if let Some(until) = record.blocked_until {
            if now < until {
                return GuardVerdict::StillBlocked;
            }
            // Window fully elapsed: reset before counting this attempt.
            record.attempts = 0;
            record.blocked_until = None;
        }

        record.attempts += 1;
        if record.attempts >= self.policy.max_attempts {
            record.blocked_until = Some(now + self.policy.block_duration);
            GuardVerdict::JustBlocked
        } else {
            GuardVerdict::Warn {
                attempts: record.attempts,
            }
        }
    }

    /// Returns true if the user is inside an active block window.
    ///
    /// Read-only probe: does not count an attempt and does not reset
    /// expired windows (that happens on the next `note_repeat`).
    pub async fn is_blocked(&self, user: ChatId) -> bool {
        let records = self.records.lock().await;
        match records.get(&user).and_then(|r| r.blocked_until) {
            Some(until) => Instant::now() < until,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: ChatId = ChatId(3003);

    fn guard(max_attempts: u32, block_secs: u64) -> AbuseGuard {
        AbuseGuard::new(GuardPolicy {
            block_duration: Duration::from_secs(block_secs),
            max_attempts,
        })
    }

    #[tokio::test]
    async fn test_sixth_attempt_triggers_block() {
        let guard = guard(6, 3600);
        for i in 1..=5 {
            assert_eq!(guard.note_repeat(USER).await, GuardVerdict::Warn { attempts: i });
        }
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::JustBlocked);
        assert!(guard.is_blocked(USER).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_during_window_are_noops() {
        let guard = guard(2, 3600);
        guard.note_repeat(USER).await;
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::JustBlocked);

        tokio::time::advance(Duration::from_secs(1800)).await;
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::StillBlocked);
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::StillBlocked);
        assert!(guard.is_blocked(USER).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_resets_attempt_count() {
        let guard = guard(3, 60);
        guard.note_repeat(USER).await;
        guard.note_repeat(USER).await;
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::JustBlocked);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!guard.is_blocked(USER).await);
        // Counting restarts from zero after the window.
        assert_eq!(guard.note_repeat(USER).await, GuardVerdict::Warn { attempts: 1 });
    }

    #[tokio::test]
    async fn test_records_are_per_user() {
        let guard = guard(2, 3600);
        guard.note_repeat(USER).await;
        assert_eq!(guard.note_repeat(ChatId(9)).await, GuardVerdict::Warn { attempts: 1 });
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_blocked() {
        let guard = guard(6, 3600);
        assert!(!guard.is_blocked(USER).await);
    }
}
