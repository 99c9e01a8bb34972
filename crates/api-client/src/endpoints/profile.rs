//! Health profile endpoints

use super::{decode_one, require_auth};
use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use healthwatch_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Accepted age range in years
pub const AGE_RANGE: (u32, u32) = (0, 120);
/// Accepted weight range in kilograms
pub const WEIGHT_RANGE_KG: (f64, f64) = (2.0, 500.0);
/// Accepted height range in centimeters
pub const HEIGHT_RANGE_CM: (f64, f64) = (30.0, 272.0);

const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Health profile API interface
#[derive(Debug, Clone)]
pub struct ProfileApi {
    client: HealthWatchClient,
}

impl ProfileApi {
    /// Create a new profile API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// The logged-in user's health profile
    ///
    /// `GET /profile/health`
    pub async fn get(&self) -> ApiResult<HealthProfile> {
        require_auth(&self.client)?;
        let data: Value = self.client.get("profile/health").await?;
        decode_one(data, "healthProfile")
    }

    /// Replace the health profile
    ///
    /// Range checks run first; an out-of-range value never reaches the API.
    ///
    /// `PUT /profile/health`
    pub async fn update(&self, profile: &HealthProfile) -> ApiResult<HealthProfile> {
        let result = profile.validate();
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }
        require_auth(&self.client)?;

        let data: Value = self.client.put("profile/health", profile).await?;
        decode_one(data, "healthProfile")
    }
}

/// Who to call in an emergency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

/// Health record kept for the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Kilograms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
}

impl HealthProfile {
    /// Range checks on age, weight and height, plus the blood type list
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut validator = Validator::new()
            .optional_range("age", self.age, AGE_RANGE.0, AGE_RANGE.1)
            .optional_range("weight", self.weight, WEIGHT_RANGE_KG.0, WEIGHT_RANGE_KG.1)
            .optional_range("height", self.height, HEIGHT_RANGE_CM.0, HEIGHT_RANGE_CM.1);

        if let Some(blood_type) = &self.blood_type {
            validator = validator.one_of("bloodType", blood_type, BLOOD_TYPES);
        }
        if let Some(contact) = &self.emergency_contact {
            validator = validator
                .required("emergencyContact.name", &contact.name)
                .required("emergencyContact.phone", &contact.phone);
        }
        validator.validate()
    }

    /// Body mass index, when weight and height are both known
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        let (weight, height) = (self.weight?, self.height?);
        let meters = height / 100.0;
        (meters > 0.0).then(|| weight / (meters * meters))
    }
}
