//! Session identifiers

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{PipelineError, Result};

/// Identifier of one tracking run, `<date>-<time>` with both halves all digits.
///
/// Ids produced by [`SessionId::now`] use `DDMMYYYY-HHMMSS`. Ordering is plain
/// string ordering, which is what the scanner relies on for reproducible output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session id.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let valid = match value.split_once('-') {
            Some((date, time)) => is_digits(date) && is_digits(time),
            None => false,
        };

        if valid { Ok(Self(value)) } else { Err(PipelineError::InvalidSessionId { value }) }
    }

    /// Session id for the current local time.
    pub fn now() -> Self {
        Self::at(&Local::now())
    }

    /// Session id for a given instant, formatted `DDMMYYYY-HHMMSS`.
    pub fn at<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(instant.format("%d%m%Y-%H%M%S").to_string())
    }

    /// Date half (day-month-year digits).
    pub fn date(&self) -> &str {
        self.split().0
    }

    /// Time half (hour-minute-second digits).
    pub fn time(&self) -> &str {
        self.split().1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split(&self) -> (&str, &str) {
        // validated on construction
        self.0.split_once('-').unwrap_or((self.0.as_str(), ""))
    }
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SessionId {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
