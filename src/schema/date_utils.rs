//! Module for handling date parsing.

use chrono::{Days, NaiveDate};

use crate::config::AnalysisConfig;

/// Configuration for date format handling
#[derive(Debug, Clone)]
pub struct DateFormatConfig {
    /// List of date format strings to try when parsing dates
    pub date_formats: Vec<String>,
    /// Enable heuristic format detection
    pub enable_format_detection: bool,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        let config = AnalysisConfig::default();
        Self::from(&config)
    }
}

impl From<&AnalysisConfig> for DateFormatConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            date_formats: config.date_formats.clone(),
            enable_format_detection: config.enable_format_detection,
        }
    }
}

/// Parse a date string with multiple format attempts
#[must_use]
pub fn parse_date_string(s: &str, config: &DateFormatConfig) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for format in &config.date_formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }

    if config.enable_format_detection {
        if let Some(detected_format) = detect_date_format(s) {
            // Datetime strings: only the leading date part matters
            let candidate = if detected_format == "%Y-%m-%d" { &s[..10] } else { s };
            if let Ok(date) = NaiveDate::parse_from_str(candidate, detected_format) {
                return Some(date);
            }
        }
    }

    None
}

/// Try to detect the date format based on string patterns
#[must_use]
pub fn detect_date_format(s: &str) -> Option<&'static str> {
    let bytes = s.as_bytes();

    // YYYY-MM-DD, possibly followed by a time part
    if bytes.len() >= 10 && bytes[4] == b'-' && bytes[7] == b'-' && s.is_char_boundary(10) {
        return Some("%Y-%m-%d");
    }

    if s.contains('/') {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() == 3 {
            if parts[0].len() == 4 {
                return Some("%Y/%m/%d");
            } else if parts[2].len() == 4 {
                // Spreadsheet exports are US-style unless the first part cannot be a month
                if let Ok(first_num) = parts[0].parse::<u8>() {
                    if first_num > 12 {
                        return Some("%d/%m/%Y");
                    }
                    return Some("%m/%d/%Y");
                }
            }
        }
    }

    if s.contains('.') {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts[2].len() == 4 {
            return Some("%d.%m.%Y");
        }
    }

    if s.len() == 8 && s.chars().all(|c| c.is_ascii_digit()) {
        return Some("%Y%m%d");
    }

    None
}

/// Convert a spreadsheet serial day number (1900 date system) to a date
#[must_use]
pub fn from_spreadsheet_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    // Day 60 is the fictitious 1900-02-29; counting from 1899-12-30 absorbs it
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.floor() as u64))
}
