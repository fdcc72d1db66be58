use crate::config::{
    EASY_RATING_BELOW, MAX_HANDLE_LEN, MAX_USERNAME_LEN, MEDIUM_RATING_BELOW, MIN_HANDLE_LEN,
    RATING_BAR_MAX, WEAKNESS_BAR_FACTOR, WEAKNESS_BAR_MIN_PCT,
};
use once_cell::sync::Lazy;
use regex::Regex;
use wasm_bindgen::JsValue;

// Compiled regexes for form validation
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static HANDLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap());

/// Difficulty badge derived from a problem rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Unrated,
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_rating(rating: Option<f64>) -> Self {
        match rating {
            Some(r) if r.is_finite() && r > 0.0 => {
                if r < EASY_RATING_BELOW {
                    Difficulty::Easy
                } else if r < MEDIUM_RATING_BELOW {
                    Difficulty::Medium
                } else {
                    Difficulty::Hard
                }
            }
            _ => Difficulty::Unrated,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Unrated => "Unrated",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Difficulty::Unrated => "badge badge-unrated",
            Difficulty::Easy => "badge badge-easy",
            Difficulty::Medium => "badge badge-medium",
            Difficulty::Hard => "badge badge-hard",
        }
    }
}

/// CSS class for a verdict badge tone ("green", "red", "yellow").
pub fn verdict_class(tone: &str) -> &'static str {
    match tone {
        "green" => "verdict verdict-ok",
        "red" => "verdict verdict-fail",
        "yellow" => "verdict verdict-warn",
        _ => "verdict",
    }
}

/// "+12" / "-30" / "+0"
pub fn format_rating_delta(delta: i64) -> String {
    format!("{:+}", delta)
}

/// Width of the current-rating bar, 0-100.
pub fn rating_bar_pct(rating: i64) -> f64 {
    (rating as f64 / RATING_BAR_MAX * 100.0).clamp(0.0, 100.0)
}

/// Width of a topic's weakness bar, 10-100.
pub fn weakness_bar_pct(score: f64) -> f64 {
    (score * WEAKNESS_BAR_FACTOR).clamp(WEAKNESS_BAR_MIN_PCT, 100.0)
}

/// "SR 40%"
pub fn format_success_rate(rate: Option<f64>) -> String {
    format!("SR {:.0}%", rate.unwrap_or(0.0) * 100.0)
}

/// Localised timestamp for the "Last synced" line.
pub fn format_last_synced(unix_seconds: Option<i64>) -> String {
    match unix_seconds {
        Some(secs) if secs > 0 => {
            let date = js_sys::Date::new(&JsValue::from_f64(secs as f64 * 1000.0));
            String::from(date.to_locale_string("default", &JsValue::UNDEFINED))
        }
        _ => "Not synced".to_string(),
    }
}

/// Form validation error
#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    Empty(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidEmail,
    InvalidHandle,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Empty(field) => write!(f, "{} cannot be empty", field),
            FieldError::TooShort(field, min) => {
                write!(f, "{} must be at least {} characters", field, min)
            }
            FieldError::TooLong(field, max) => write!(f, "{} cannot exceed {} characters", field, max),
            FieldError::InvalidEmail => write!(f, "Enter a valid email address"),
            FieldError::InvalidHandle => write!(
                f,
                "Codeforces handles use only letters, digits, '_', '-' and '.'"
            ),
        }
    }
}

impl std::error::Error for FieldError {}

/// Generic text input validation
pub fn validate_text(
    input: &str,
    min: Option<usize>,
    max: Option<usize>,
    field_name: &'static str,
) -> Result<String, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty(field_name));
    }
    let len = trimmed.chars().count();
    if let Some(min_len) = min {
        if len < min_len {
            return Err(FieldError::TooShort(field_name, min_len));
        }
    }
    if let Some(max_len) = max {
        if len > max_len {
            return Err(FieldError::TooLong(field_name, max_len));
        }
    }
    Ok(trimmed.to_string())
}

pub fn validate_username(input: &str) -> Result<String, FieldError> {
    validate_text(input, None, Some(MAX_USERNAME_LEN), "Username")
}

pub fn validate_email(input: &str) -> Result<String, FieldError> {
    let email = validate_text(input, None, None, "Email")?;
    if EMAIL_REGEX.is_match(&email) {
        Ok(email)
    } else {
        Err(FieldError::InvalidEmail)
    }
}

/// Passwords are sent as typed; only emptiness is checked.
pub fn validate_password(input: &str) -> Result<String, FieldError> {
    if input.is_empty() {
        return Err(FieldError::Empty("Password"));
    }
    Ok(input.to_string())
}

pub fn validate_handle(input: &str) -> Result<String, FieldError> {
    let handle = validate_text(
        input,
        Some(MIN_HANDLE_LEN),
        Some(MAX_HANDLE_LEN),
        "Codeforces ID",
    )?;
    if HANDLE_REGEX.is_match(&handle) {
        Ok(handle)
    } else {
        Err(FieldError::InvalidHandle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_thresholds() {
        assert_eq!(Difficulty::from_rating(None), Difficulty::Unrated);
        assert_eq!(Difficulty::from_rating(Some(0.0)), Difficulty::Unrated);
        assert_eq!(Difficulty::from_rating(Some(f64::NAN)), Difficulty::Unrated);
        assert_eq!(Difficulty::from_rating(Some(800.0)), Difficulty::Easy);
        assert_eq!(Difficulty::from_rating(Some(1200.0)), Difficulty::Medium);
        assert_eq!(Difficulty::from_rating(Some(1699.0)), Difficulty::Medium);
        assert_eq!(Difficulty::from_rating(Some(1700.0)), Difficulty::Hard);
    }

    #[test]
    fn rating_delta_is_signed() {
        assert_eq!(format_rating_delta(12), "+12");
        assert_eq!(format_rating_delta(-30), "-30");
        assert_eq!(format_rating_delta(0), "+0");
    }

    #[test]
    fn bars_are_clamped() {
        assert_eq!(rating_bar_pct(-100), 0.0);
        assert_eq!(rating_bar_pct(1750), 50.0);
        assert_eq!(rating_bar_pct(4000), 100.0);
        assert_eq!(weakness_bar_pct(0.1), 10.0);
        assert_eq!(weakness_bar_pct(1.5), 60.0);
        assert_eq!(weakness_bar_pct(9.0), 100.0);
    }

    #[test]
    fn success_rate_rounds_to_percent() {
        assert_eq!(format_success_rate(Some(0.456)), "SR 46%");
        assert_eq!(format_success_rate(None), "SR 0%");
    }

    #[test]
    fn email_validation() {
        assert_eq!(validate_email(" dev@example.com "), Ok("dev@example.com".into()));
        assert_eq!(validate_email(""), Err(FieldError::Empty("Email")));
        assert_eq!(validate_email("dev@example"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("a b@c.d"), Err(FieldError::InvalidEmail));
    }

    #[test]
    fn handle_validation() {
        assert_eq!(validate_handle("tourist"), Ok("tourist".into()));
        assert_eq!(validate_handle("Um_nik"), Ok("Um_nik".into()));
        assert_eq!(
            validate_handle("ab"),
            Err(FieldError::TooShort("Codeforces ID", MIN_HANDLE_LEN))
        );
        assert_eq!(validate_handle("bad handle"), Err(FieldError::InvalidHandle));
        assert_eq!(
            validate_handle(&"x".repeat(MAX_HANDLE_LEN + 1)),
            Err(FieldError::TooLong("Codeforces ID", MAX_HANDLE_LEN))
        );
    }

    #[test]
    fn password_is_not_trimmed() {
        assert_eq!(validate_password(" secret "), Ok(" secret ".into()));
        assert_eq!(validate_password(""), Err(FieldError::Empty("Password")));
    }

    #[test]
    fn field_errors_read_well() {
        assert_eq!(
            FieldError::Empty("Username").to_string(),
            "Username cannot be empty"
        );
        assert_eq!(
            FieldError::TooLong("Username", 32).to_string(),
            "Username cannot exceed 32 characters"
        );
    }
}
