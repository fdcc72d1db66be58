//! Application-level configuration constants.

// UI Behavior
pub const AUTO_SYNC_INTERVAL_MS: u32 = 5 * 60 * 1000;
pub const SUBMISSION_WINDOW_NAME: &str = "cf-submission-view";
pub const SUBMISSION_WINDOW_FEATURES: &str =
    "width=1200,height=800,menubar=no,toolbar=no,location=yes";
pub const CODEFORCES_LOGIN_URL: &str = "https://codeforces.com/enter";

// Rating display
pub const RATING_BAR_MAX: f64 = 3500.0;
pub const EASY_RATING_BELOW: f64 = 1200.0;
pub const MEDIUM_RATING_BELOW: f64 = 1700.0;

// Weakness bar: score * factor, clamped to a visible range
pub const WEAKNESS_BAR_FACTOR: f64 = 40.0;
pub const WEAKNESS_BAR_MIN_PCT: f64 = 10.0;

// Form limits
pub const MIN_HANDLE_LEN: usize = 3;
pub const MAX_HANDLE_LEN: usize = 24;
pub const MAX_USERNAME_LEN: usize = 32;
