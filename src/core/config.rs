use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot
/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Channel invite link sent after the questionnaire is completed
/// Read from CHANNEL_URL environment variable
/// Default: empty (no call-to-action is sent)
pub static CHANNEL_URL: Lazy<String> = Lazy::new(|| env::var("CHANNEL_URL").unwrap_or_else(|_| String::new()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: app.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "app.log".to_string()));

/// Port for the keep-alive HTTP stub (hosting platforms ping it to keep
/// the container warm). Read from KEEP_ALIVE_PORT environment variable.
/// Default: 5000. Set to 0 to disable the server entirely.
pub static KEEP_ALIVE_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("KEEP_ALIVE_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
});

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    /// Submission summaries, donation receipts and refund notices go to
    /// every ID in this list.
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });

    /// Primary admin user ID for direct messages
    /// Read from ADMIN_USER_ID or fallback to first ADMIN_IDS entry
    /// Defaults to 0 if not set (no admin notifications)
    pub static ADMIN_USER_ID: Lazy<i64> = Lazy::new(|| {
        env::var("ADMIN_USER_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| ADMIN_IDS.first().copied())
            .unwrap_or(0)
    });

    /// Returns true if the given user is a configured operator.
    pub fn is_admin(user_id: i64) -> bool {
        user_id != 0 && (*ADMIN_USER_ID == user_id || ADMIN_IDS.contains(&user_id))
    }

}

/// Abuse guard policy (repeat /start attempts by already-completed users)
pub mod guard {
    use super::Duration;
    use once_cell::sync::Lazy;
    use std::env;

    /// How long a user stays blocked once the attempt threshold is hit
    /// Read from GUARD_BLOCK_DURATION_SECS environment variable
    /// Default: 3600 (1 hour)
    pub static BLOCK_DURATION_SECS: Lazy<u64> = Lazy::new(|| {
        env::var("GUARD_BLOCK_DURATION_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600)
    });

    /// Repeat attempts tolerated before the block kicks in
    /// Read from GUARD_MAX_ATTEMPTS environment variable
    /// Default: 6
    pub static MAX_ATTEMPTS: Lazy<u32> = Lazy::new(|| {
        env::var("GUARD_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6)
    });

    /// Whether a blocked user is told about the block instead of being
    /// silently ignored. The silent drop is an anti-enumeration measure,
    /// so it stays the default.
    /// Read from GUARD_REVEAL_BLOCK environment variable
    /// Default: false
    pub static REVEAL_BLOCK: Lazy<bool> = Lazy::new(|| {
        env::var("GUARD_REVEAL_BLOCK")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
    });

    /// Block duration
    pub fn block_duration() -> Duration {
        Duration::from_secs(*BLOCK_DURATION_SECS)
    }
}

/// Donation flow configuration
pub mod donation {
    use once_cell::sync::Lazy;
    use std::env;

    /// Invoice currency. XTR = Telegram Stars (no provider token needed).
    /// Read from DONATION_CURRENCY environment variable
    pub static CURRENCY: Lazy<String> =
        Lazy::new(|| env::var("DONATION_CURRENCY").unwrap_or_else(|_| "XTR".to_string()));

    /// Fixed denomination menu, in minor currency units (Stars)
    pub const AMOUNTS: [u32; 4] = [10, 50, 100, 500];

    /// Bounds for the free-form custom amount
    pub const MIN_CUSTOM_AMOUNT: u32 = 1;
    pub const MAX_CUSTOM_AMOUNT: u32 = 100_000;
}
