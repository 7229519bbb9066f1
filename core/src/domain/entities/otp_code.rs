//! One-time-password codes and display prefixes.

use constant_time_eq::constant_time_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::errors::{OtpError, OtpResult};

/// Smallest code ever generated
pub const CODE_MIN: u32 = 100_000;

/// Largest code ever generated
pub const CODE_MAX: u32 = 999_999;

/// Number of digits in a code
pub const CODE_LENGTH: usize = 6;

/// Number of letters in a prefix tag
pub const PREFIX_LENGTH: usize = 3;

/// Separator appended to the prefix letters
pub const PREFIX_SEPARATOR: char = ':';

/// Three-letter combinations never used as a prefix
pub const PREFIX_DENYLIST: &[&str] = &["ASS", "FUK", "FUC", "PIG", "OTP"];

const MAX_PREFIX_DRAWS: usize = 64;
const FALLBACK_PREFIX: &str = "AAA";

/// Check whether a three-letter combination is on the denylist
pub fn is_denylisted_prefix(letters: &str) -> bool {
    PREFIX_DENYLIST
        .iter()
        .any(|denied| denied.eq_ignore_ascii_case(letters))
}

/// Parse a user-entered code
///
/// Accepts exactly six ASCII digits after trimming surrounding whitespace.
pub fn parse_code(input: &str) -> OtpResult<u32> {
    let trimmed = input.trim();
    if trimmed.len() != CODE_LENGTH || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(OtpError::InvalidCode {
            reason: format!("expected {} digits", CODE_LENGTH),
        });
    }
    trimmed.parse::<u32>().map_err(|e| OtpError::InvalidCode {
        reason: e.to_string(),
    })
}

/// A generated code together with its display prefix
///
/// Only the numeric code takes part in verification; the prefix lets the
/// user match the message they received against the prompt on screen.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpSecret {
    prefix: String,
    code: u32,
}

impl OtpSecret {
    /// Create a secret from a prefix (including separator) and a code
    pub fn new(prefix: impl Into<String>, code: u32) -> Self {
        Self {
            prefix: prefix.into(),
            code,
        }
    }

    /// Prefix tag including the separator, e.g. `ABC:`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The numeric code
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Text delivered to the user: prefix followed by the code
    pub fn payload(&self) -> String {
        format!("{}{}", self.prefix, self.code)
    }

    /// Compare a submitted code in constant time
    pub fn matches(&self, submitted: u32) -> bool {
        constant_time_eq(&self.code.to_be_bytes(), &submitted.to_be_bytes())
    }
}

// Codes must never end up in logs through `{:?}`.
impl fmt::Debug for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpSecret")
            .field("prefix", &self.prefix)
            .field("code", &"******")
            .finish()
    }
}

/// Random source for codes and prefixes
///
/// Draws are serialized behind a mutex so two channels dispatching at the
/// same time can share one generator.
pub struct OtpGenerator {
    rng: Mutex<StdRng>,
}

impl OtpGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a deterministic generator (tests and simulations)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw a code uniformly from `[CODE_MIN, CODE_MAX]`
    pub fn generate_code(&self) -> u32 {
        self.rng().gen_range(CODE_MIN..=CODE_MAX)
    }

    /// Draw a prefix of three uppercase letters plus separator, skipping
    /// denylisted combinations
    pub fn generate_prefix(&self) -> String {
        let mut rng = self.rng();
        Self::draw_prefix(&mut rng)
    }

    /// Draw a fresh prefix and code under a single lock
    pub fn generate_secret(&self) -> OtpSecret {
        let mut rng = self.rng();
        let prefix = Self::draw_prefix(&mut rng);
        let code = rng.gen_range(CODE_MIN..=CODE_MAX);
        OtpSecret::new(prefix, code)
    }

    fn draw_prefix(rng: &mut StdRng) -> String {
        for _ in 0..MAX_PREFIX_DRAWS {
            let letters: String = (0..PREFIX_LENGTH)
                .map(|_| char::from(b'A' + rng.gen_range(0..26u8)))
                .collect();
            if !is_denylisted_prefix(&letters) {
                return format!("{}{}", letters, PREFIX_SEPARATOR);
            }
        }
        format!("{}{}", FALLBACK_PREFIX, PREFIX_SEPARATOR)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self::new()
    }
}
