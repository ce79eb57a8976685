// src/models/ugly_url.rs - Pure data structures
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Ugliness level, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct UglinessLevel(u8);

impl UglinessLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Clamps any integer into range; out-of-range input is not an error.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(Self::MIN as i64, Self::MAX as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

// DTO for an uglification request, submitted as a form
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UglifyRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please provide a URL"))]
    pub url: String,

    // Kept as text: anything that is not an integer falls back to the default
    pub ugliness: Option<String>,
}

impl UglifyRequestDto {
    /// Parsed ugliness, or `default` when missing or not an integer.
    pub fn ugliness_or(&self, default: i64) -> i64 {
        self.ugliness
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(default)
    }
}

// DTO for response with the ugly URL and some bragging statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct UglifyResponseDto {
    pub original_url: String,
    pub ugly_url: String,
    pub original_length: usize,
    pub ugly_length: usize,
    pub increase: i64,
    pub increase_pct: f64,
    pub ugliness_level: u8,
}

impl UglifyResponseDto {
    pub fn new(original_url: String, ugly_url: String, level: UglinessLevel) -> Self {
        let original_length = original_url.chars().count();
        let ugly_length = ugly_url.chars().count();
        let increase = ugly_length as i64 - original_length as i64;
        let increase_pct = if original_length > 0 {
            increase as f64 / original_length as f64 * 100.0
        } else {
            0.0
        };

        Self {
            original_url,
            ugly_url,
            original_length,
            ugly_length,
            increase,
            increase_pct,
            ugliness_level: level.get(),
        }
    }
}
