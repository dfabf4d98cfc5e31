//! Alert record model, validation and canonical serialization.
//!
//! The canonical byte encoding is what gets chunked onto the radio link; the
//! receiving client reassembles and parses that exact stream, so field order
//! and compactness are part of the wire contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{ProtocolError, ValidationError};

/// Alert severity levels, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Extraordinary threat to life or property
    Extreme,
    /// Significant threat
    Severe,
    /// Possible threat
    Moderate,
    /// Minimal threat
    Minor,
    /// Unclassified
    Unknown,
}

impl Severity {
    /// All recognized severities.
    pub const ALL: [Severity; 5] = [
        Severity::Extreme,
        Severity::Severe,
        Severity::Moderate,
        Severity::Minor,
        Severity::Unknown,
    ];

    /// Single-byte encoding used in the advertisement summary.
    pub fn as_byte(self) -> u8 {
        match self {
            Severity::Extreme => 4,
            Severity::Severe => 3,
            Severity::Moderate => 2,
            Severity::Minor => 1,
            Severity::Unknown => 0,
        }
    }

    /// Wire label, exactly as it appears in the canonical serialization.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Extreme => "Extreme",
            Severity::Severe => "Severe",
            Severity::Moderate => "Moderate",
            Severity::Minor => "Minor",
            Severity::Unknown => "Unknown",
        }
    }

    /// Lenient label lookup; `None` for anything unrecognized.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Extreme" => Some(Severity::Extreme),
            "Severe" => Some(Severity::Severe),
            "Moderate" => Some(Severity::Moderate),
            "Minor" => Some(Severity::Minor),
            "Unknown" => Some(Severity::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ValidationError::InvalidSeverity(s.to_string()))
    }
}

/// The public-alert record broadcast to clients.
///
/// Field order here is the wire key order of the canonical serialization;
/// do not reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Stable short identifier; caller-supplied or derived from
    /// headline + expiry so identical logical alerts collapse to one id
    pub alert_id: String,
    /// Alert severity
    pub severity: Severity,
    /// Headline shown to the receiving user
    pub headline: String,
    /// Expiry as unix seconds
    pub expires: i64,
    /// Safety instructions
    pub instructions: String,
    /// Authoritative source URL
    pub source_url: String,
    /// Whether the alert has been verified against its source
    pub verified: bool,
    /// Fetch time as unix seconds
    pub fetched_at: i64,
}

impl AlertRecord {
    /// Start building a record.
    pub fn builder() -> AlertBuilder {
        AlertBuilder::default()
    }

    /// Check the record invariants.
    ///
    /// Severity needs no check here: the type admits only the fixed set, and
    /// parsing rejects anything else before a record exists.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.headline.trim().is_empty() {
            return Err(ValidationError::EmptyField("headline"));
        }
        if self.instructions.trim().is_empty() {
            return Err(ValidationError::EmptyField("instructions"));
        }
        if self.source_url.trim().is_empty() {
            return Err(ValidationError::EmptyField("sourceUrl"));
        }
        if self.expires <= 0 {
            return Err(ValidationError::NonPositiveTimestamp {
                field: "expires",
                value: self.expires,
            });
        }
        if self.fetched_at <= 0 {
            return Err(ValidationError::NonPositiveTimestamp {
                field: "fetchedAt",
                value: self.fetched_at,
            });
        }
        Ok(())
    }

    /// Compact deterministic byte encoding of all eight fields.
    ///
    /// Byte-identical across calls for the same record: the receiver
    /// reassembles chunk payloads and parses this exact stream.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate a record from its canonical encoding.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let record: Self = serde_json::from_slice(bytes)?;
        record.validate()?;
        Ok(record)
    }
}

/// Builder for [`AlertRecord`].
///
/// Fills a derived alert id and a now() fetch time when absent, then
/// validates before returning.
#[derive(Debug, Default)]
pub struct AlertBuilder {
    alert_id: Option<String>,
    severity: Option<Severity>,
    headline: Option<String>,
    expires: Option<i64>,
    instructions: Option<String>,
    source_url: Option<String>,
    verified: bool,
    fetched_at: Option<i64>,
}

impl AlertBuilder {
    /// Set an explicit alert id instead of deriving one.
    pub fn alert_id(mut self, id: impl Into<String>) -> Self {
        self.alert_id = Some(id.into());
        self
    }

    /// Set the severity (defaults to `Unknown`).
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set the headline.
    pub fn headline(mut self, headline: impl Into<String>) -> Self {
        self.headline = Some(headline.into());
        self
    }

    /// Set the expiry as unix seconds.
    pub fn expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set the safety instructions.
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Set the source URL.
    pub fn source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }

    /// Mark the alert as verified.
    pub fn verified(mut self, verified: bool) -> Self {
        self.verified = verified;
        self
    }

    /// Set the fetch time as unix seconds (defaults to now).
    pub fn fetched_at(mut self, fetched_at: i64) -> Self {
        self.fetched_at = Some(fetched_at);
        self
    }

    /// Build and validate the record.
    pub fn build(self) -> Result<AlertRecord, ValidationError> {
        let headline = self.headline.unwrap_or_default();
        let expires = self.expires.unwrap_or(0);
        let alert_id = match self.alert_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => generate_alert_id(&headline, expires),
        };

        let record = AlertRecord {
            alert_id,
            severity: self.severity.unwrap_or(Severity::Unknown),
            headline,
            expires,
            instructions: self.instructions.unwrap_or_default(),
            source_url: self.source_url.unwrap_or_default(),
            verified: self.verified,
            fetched_at: self.fetched_at.unwrap_or_else(now_epoch),
        };
        record.validate()?;
        Ok(record)
    }
}

/// Current unix time in seconds.
pub fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Parse unix seconds or an ISO-8601 timestamp into unix seconds.
///
/// Naive timestamps (no offset) are taken as UTC.
pub fn parse_epoch(value: &str) -> Result<i64, ValidationError> {
    if let Ok(secs) = value.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc().timestamp());
    }
    Err(ValidationError::InvalidTimestamp(value.to_string()))
}

/// Derive a stable short alert id from headline and expiry.
///
/// First 8 hex characters of SHA-1(headline ++ decimal expiry), the
/// convention of the companion mobile parser, so both sides agree on the id
/// without exchanging it.
pub fn generate_alert_id(headline: &str, expires: i64) -> String {
    let mut hasher = Sha1::new();
    hasher.update(headline.as_bytes());
    hasher.update(expires.to_string().as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..4])
}
