//! Contact utilities for phone numbers and email addresses
//!
//! Destinations are opaque strings to the verification engine; these helpers
//! only exist for logging (masking), display (hints) and optional format
//! checks by notifier implementations.

use once_cell::sync::Lazy;
use regex::Regex;

// International phone number regex (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid E.164 regex"));

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").expect("valid email regex")
});

/// Normalize a phone number by removing common formatting characters
pub fn normalize_phone_number(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check if a phone number is valid (international E.164 format)
pub fn is_valid_phone_number(phone: &str) -> bool {
    INTERNATIONAL_PHONE_REGEX.is_match(&normalize_phone_number(phone))
}

/// Check if an email address has a plausible `local@domain.tld` shape
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Mask a phone number for logging, keeping only the last 4 digits
///
/// ```
/// use otp_shared::contact::mask_phone_number;
/// assert_eq!(mask_phone_number("+1234567890"), "+******7890");
/// ```
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible_digits = 4;
    let masked_count = chars.len() - visible_digits;
    let last_digits: String = chars[chars.len() - visible_digits..].iter().collect();

    if chars[0] == '+' {
        format!("+{}{}", "*".repeat(masked_count - 1), last_digits)
    } else {
        format!("{}{}", "*".repeat(masked_count), last_digits)
    }
}

/// Mask an email address for logging (e.g. `a***@example.com`)
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

/// Mask any destination, picking the email or phone style by shape
pub fn mask_destination(destination: &str) -> String {
    if destination.contains('@') {
        mask_email(destination)
    } else {
        mask_phone_number(destination)
    }
}

/// Short hint of a destination suitable for showing to the user
///
/// The hint is the first two characters, `...`, then the text after the
/// last `.` when there is one (the top-level domain of an email), otherwise
/// the last two characters.
///
/// ```
/// use otp_shared::contact::destination_hint;
/// assert_eq!(destination_hint("+15551234"), "+1...34");
/// assert_eq!(destination_hint("a@b.com"), "a@...com");
/// ```
pub fn destination_hint(destination: &str) -> String {
    let chars: Vec<char> = destination.chars().collect();
    let head: String = chars.iter().take(2).collect();
    let tail = match destination.rfind('.') {
        Some(index) => destination[index + 1..].to_string(),
        None => chars[chars.len().saturating_sub(2)..].iter().collect(),
    };
    format!("{}...{}", head, tail)
}

/// Combined hint for every destination a code was sent to
///
/// ```
/// use otp_shared::contact::sent_to_hint;
/// assert_eq!(sent_to_hint(&["+15551234", "a@b.com"]), "OTP sent to +1...34 & a@...com");
/// ```
pub fn sent_to_hint(destinations: &[&str]) -> String {
    let hints: Vec<String> = destinations.iter().map(|d| destination_hint(d)).collect();
    format!("OTP sent to {}", hints.join(" & "))
}
