use crate::outcome::Outcome;
use crate::types::{Appointment, AppointmentId};
use serde::Serialize;
use std::time::Duration;

pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Body POSTed to the booking workflow.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppointmentPayload {
    pub appointment_id: AppointmentId,
    pub full_name: String,
    pub phone: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub reason: Option<String>,
}

impl From<&Appointment> for AppointmentPayload {
    fn from(appt: &Appointment) -> Self {
        Self {
            appointment_id: appt.id,
            full_name: appt.full_name.clone(),
            phone: appt.phone.clone(),
            preferred_date: appt.preferred_date.clone(),
            preferred_time: appt.preferred_time.clone(),
            reason: appt.reason.clone(),
        }
    }
}

/// Notifies an external automation workflow (n8n) of new appointments.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Deliver the appointment.
    ///
    /// `Ready(Some(body))` carries the workflow's JSON reply when it answered
    /// 200; any other status is `Ready(None)`. Transport errors degrade.
    pub async fn notify_appointment(&self, appointment: &Appointment) -> Outcome<Option<String>> {
        let payload = AppointmentPayload::from(appointment);

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Appointment webhook to {} failed: {}", self.url, e);
                return Outcome::degraded(e.to_string());
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            log::warn!(
                "Appointment webhook returned HTTP {} for {}",
                response.status().as_u16(),
                appointment.id
            );
            return Outcome::Ready(None);
        }

        match response.json::<serde_json::Value>().await {
            Ok(body) => {
                log::info!("Appointment sent to webhook: {}", appointment.id);
                Outcome::Ready(Some(body.to_string()))
            }
            Err(e) => {
                log::warn!("Appointment webhook reply was not JSON: {}", e);
                Outcome::degraded(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AppointmentRequest;

    fn appointment() -> Appointment {
        Appointment::from_request(AppointmentRequest {
            full_name: "Kwame Asante".into(),
            phone: "+233241112222".into(),
            preferred_date: "2026-11-03".into(),
            preferred_time: "09:30".into(),
            reason: Some("Follow-up".into()),
        })
    }

    #[test]
    fn test_payload_shape() {
        let appt = appointment();
        let value = serde_json::to_value(AppointmentPayload::from(&appt)).unwrap();
        assert_eq!(value["appointment_id"], appt.id.to_string());
        assert_eq!(value["full_name"], "Kwame Asante");
        assert_eq!(value["reason"], "Follow-up");
    }

    #[tokio::test]
    async fn test_unreachable_webhook_degrades() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", Some("k".into())).unwrap();
        assert!(!notifier.notify_appointment(&appointment()).await.is_ready());
    }
}
