//! Appointment booking endpoints

use super::{decode_list, decode_one, path_segment, require_auth};
use crate::client::HealthWatchClient;
use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};
use healthwatch_core::validation::{ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Appointments API interface
#[derive(Debug, Clone)]
pub struct AppointmentsApi {
    client: HealthWatchClient,
}

impl AppointmentsApi {
    /// Create a new appointments API interface
    pub(crate) fn new(client: HealthWatchClient) -> Self {
        Self { client }
    }

    /// The user's appointments, soonest first
    ///
    /// `GET /appointments`
    pub async fn list(&self) -> ApiResult<Vec<Appointment>> {
        require_auth(&self.client)?;
        let data: Value = self.client.get("appointments").await?;
        let mut appointments: Vec<Appointment> = decode_list(data, "appointments")?;
        appointments.sort_by_key(|a| a.date);
        Ok(appointments)
    }

    /// Book an appointment
    ///
    /// `POST /appointments`
    pub async fn book(&self, request: &BookAppointment) -> ApiResult<Appointment> {
        let result = request.validate(Utc::now());
        if !result.is_valid() {
            return Err(ApiError::from_validation(&result));
        }
        require_auth(&self.client)?;

        let data: Value = self.client.post("appointments", request).await?;
        let appointment: Appointment = decode_one(data, "appointment")?;
        info!(appointment_id = %appointment.id, "Appointment booked");
        Ok(appointment)
    }

    /// Cancel an appointment
    ///
    /// `PATCH /appointments/:id/cancel`
    pub async fn cancel(&self, id: &str) -> ApiResult<Appointment> {
        require_auth(&self.client)?;
        let path = format!("appointments/{}/cancel", path_segment(id)?);
        let data: Value = self.client.patch(&path).await?;
        decode_one(data, "appointment")
    }
}

/// Appointment lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// A booked appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    /// Clinic, hospital or practitioner
    #[serde(alias = "provider")]
    pub facility: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Appointment {
    /// Whether it can still be cancelled at `now`
    #[must_use]
    pub fn is_cancellable(&self, now: DateTime<Utc>) -> bool {
        self.status == AppointmentStatus::Scheduled && self.date > now
    }
}

/// Booking request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointment {
    pub facility: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BookAppointment {
    /// Client-side checks before submitting
    #[must_use]
    pub fn validate(&self, now: DateTime<Utc>) -> ValidationResult {
        Validator::new()
            .required("facility", &self.facility)
            .max_length("reason", self.reason.as_deref().unwrap_or_default(), 500)
            .custom("date", || {
                (self.date <= now).then(|| "Appointment must be in the future".to_string())
            })
            .validate()
    }
}
