//! Symptom log endpoints

use super::{decode_list, decode_one, require_auth};
use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use healthwatch_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Symptoms API interface
#[derive(Debug, Clone)]
pub struct SymptomsApi {
    client: HealthWatchClient,
}

impl SymptomsApi {
    /// Create a new symptoms API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// Logged symptoms, newest first
    ///
    /// `GET /symptoms`
    pub async fn list(&self) -> ApiResult<Vec<SymptomEntry>> {
        require_auth(&self.client)?;
        let data: Value = self.client.get("symptoms").await?;
        let mut entries: Vec<SymptomEntry> = decode_list(data, "symptoms")?;
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }

    /// Log symptoms
    ///
    /// `POST /symptoms`
    pub async fn log(&self, entry: &NewSymptomEntry) -> ApiResult<SymptomEntry> {
        let result = entry.validate();
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }
        require_auth(&self.client)?;

        let data: Value = self.client.post("symptoms", entry).await?;
        decode_one(data, "symptom")
    }
}

/// How bad it is
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Parse a CLI or form value
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mild" | "low" => Some(Self::Mild),
            "moderate" | "medium" => Some(Self::Moderate),
            "severe" | "high" => Some(Self::Severe),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        })
    }
}

/// A logged set of symptoms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomEntry {
    pub id: String,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(alias = "date", alias = "createdAt")]
    pub recorded_at: DateTime<Utc>,
}

/// Symptoms to log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSymptomEntry {
    pub symptoms: Vec<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Defaults to now on the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl NewSymptomEntry {
    /// Client-side checks before submitting
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let notes = self.notes.as_deref().unwrap_or_default();
        Validator::new()
            .custom("symptoms", || {
                let any = self.symptoms.iter().any(|s| !s.trim().is_empty());
                (!any).then(|| "At least one symptom is required".to_string())
            })
            .max_length("notes", notes, 1000)
            .custom("recordedAt", || {
                self.recorded_at
                    .filter(|at| *at > Utc::now())
                    .map(|_| "Cannot log symptoms in the future".to_string())
            })
            .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_validate() {
        let empty = NewSymptomEntry {
            symptoms: vec![" ".into()],
            severity: Severity::Mild,
            notes: None,
            recorded_at: Some(Utc::now() + Duration::hours(2)),
        };
        let fields = empty.validate().field_errors();
        assert!(fields.get("symptoms").is_some());
        assert!(fields.get("recordedAt").is_some());

        let ok = NewSymptomEntry {
            symptoms: vec!["headache".into(), "fever".into()],
            severity: Severity::Moderate,
            notes: Some("since yesterday".into()),
            recorded_at: None,
        };
        assert!(ok.validate().is_valid());
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("High"), Some(Severity::Severe));
        assert_eq!(Severity::parse("moderate"), Some(Severity::Moderate));
        assert_eq!(Severity::parse("unbearable"), None);
    }

    #[test]
    fn test_entry_from_wire() {
        let entries: Vec<SymptomEntry> = decode_list(
            json!({"symptoms": [{"_id": "s1", "symptoms": ["cough"], "severity": "severe", "date": "2025-10-16T08:00:00Z"}]}),
            "symptoms",
        )
        .unwrap();
        assert_eq!(entries[0].id, "s1");
        assert_eq!(entries[0].severity, Severity::Severe);
    }
}
