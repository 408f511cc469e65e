use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One live session as reported by the session source.
///
/// Only `key` and `age` are always present; everything else is optional and
/// stays `None` when the source omitted it or sent something unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    #[serde(default)]
    pub key: String,
    /// Free-form age such as `"3 hours"` or `"12 minutes"`.
    #[serde(default)]
    pub age: String,
    /// Token usage in `<used>/<total>` form, e.g. `"45k/200k"`.
    #[serde(default)]
    pub tokens: Option<String>,
    #[serde(default)]
    pub flags: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SessionRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = age.into();
        self
    }

    pub fn with_tokens(mut self, tokens: impl Into<String>) -> Self {
        self.tokens = Some(tokens.into());
        self
    }

    pub fn with_flags(mut self, flags: Value) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    pub fn is_subagent(&self) -> bool {
        self.key.contains("subagent")
    }

    /// True when the stringified flags mention `system`.
    pub fn has_system_flag(&self) -> bool {
        match &self.flags {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => s.contains("system"),
            Some(other) => other.to_string().contains("system"),
        }
    }

    /// Parsed token usage, or `None` when absent or malformed.
    pub fn token_usage(&self) -> Option<TokenUsage> {
        self.tokens
            .as_deref()
            .and_then(|raw| TokenUsage::parse(raw).ok())
    }

    /// Leading integer of the age string (`"6 hours"` -> 6).
    pub fn age_leading_number(&self) -> Option<i64> {
        self.age.split_whitespace().next()?.parse().ok()
    }

    /// Stale-session filter: non-main sessions older than `max_hours` hours.
    ///
    /// Ages that do not start with an integer are never stale.
    pub fn is_stale(&self, max_hours: i64) -> bool {
        if self.key.contains("main") || !self.age.contains("hour") {
            return false;
        }
        matches!(self.age_leading_number(), Some(n) if n > max_hours)
    }

    /// Age converted to hours, when it reads as `<number> <unit>`.
    pub fn age_hours(&self) -> Option<f64> {
        parse_age_hours(&self.age)
    }
}

/// Converts an age such as `"3 hours"`, `"45 minutes ago"` or `"2 days"` to hours.
pub fn parse_age_hours(age: &str) -> Option<f64> {
    let lower = age.trim().to_lowercase();
    if lower == "just now" || lower == "now" {
        return Some(0.0);
    }

    let mut parts = lower.split_whitespace();
    let amount: f64 = parts.next()?.parse().ok()?;
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    let unit = parts.next()?;

    let per_hour = if unit.starts_with("sec") {
        1.0 / 3600.0
    } else if unit.starts_with("min") {
        1.0 / 60.0
    } else if unit.starts_with("hour") || unit == "h" || unit == "hr" || unit == "hrs" {
        1.0
    } else if unit.starts_with("day") {
        24.0
    } else if unit.starts_with("week") {
        168.0
    } else {
        return None;
    };

    Some(amount * per_hour)
}

/// Token consumption parsed from a `<used>/<total>` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenUsage {
    pub used: f64,
    pub total: f64,
}

impl TokenUsage {
    /// Parses `"5000/10000"`, `"45k/200k"` or `"1.5K/8K"`.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let (used, total) = raw
            .split_once('/')
            .ok_or_else(|| ParseError::InvalidFormat(format!("missing '/': {raw}")))?;
        if total.contains('/') {
            return Err(ParseError::InvalidFormat(format!("extra '/': {raw}")));
        }

        let used = parse_token_amount(used)?;
        let total = parse_token_amount(total)?;
        if total == 0.0 {
            return Err(ParseError::InvalidFormat(format!("zero total: {raw}")));
        }

        Ok(Self { used, total })
    }

    /// Usage as a whole percentage, floored and clamped to `0..=100`.
    pub fn percent(&self) -> u8 {
        let pct = (self.used * 100.0 / self.total).floor();
        pct.clamp(0.0, 100.0) as u8
    }
}

fn parse_token_amount(raw: &str) -> Result<f64, ParseError> {
    let trimmed = raw.trim();
    let (digits, multiplier) = match trimmed.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, 1000.0),
        None => (trimmed, 1.0),
    };

    let value: f64 = digits
        .parse()
        .map_err(|_| ParseError::InvalidFormat(format!("not a number: {raw}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(ParseError::InvalidFormat(format!("out of range: {raw}")));
    }

    Ok(value * multiplier)
}
