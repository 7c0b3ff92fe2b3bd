use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use reqwest::blocking::multipart::{Form, Part};
use thiserror::Error;

use crate::config::BusinessConfig;
use crate::export::ExportedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Invoice,
    Contract,
}

impl ReminderKind {
    pub fn document_name(self) -> &'static str {
        match self {
            ReminderKind::Invoice => "Invoice",
            ReminderKind::Contract => "Contract",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReminderRequest {
    pub client_email: String,
    pub client_name: String,
    pub shoot_date: Option<NaiveDateTime>,
    pub shoot_location: Option<String>,
    pub custom_message: Option<String>,
    pub kind: ReminderKind,
    pub attachment: Option<ExportedFile>,
}

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Missing email address. Please add a client email address first.")]
    MissingClientEmail,
    #[error("{0}")]
    Delivery(String),
    #[error("Network or configuration error. Please check your internet connection and email settings.")]
    Transport(#[from] reqwest::Error),
}

/// Flat template-parameter map for the transactional email template, in a
/// fixed order. `today` substitutes for a missing shoot date; the configured
/// default location substitutes for a missing shoot location.
pub fn template_params(
    config: &BusinessConfig,
    req: &ReminderRequest,
    today: NaiveDate,
) -> Vec<(String, String)> {
    let shoot = req.shoot_date.map(|dt| dt.date()).unwrap_or(today);
    let location = req
        .shoot_location
        .clone()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| config.default_shoot_location.clone());

    let mut params = vec![
        ("to_email".to_string(), req.client_email.clone()),
        ("name".to_string(), req.client_name.clone()),
        ("shoot_day".to_string(), shoot.format("%A").to_string()),
        ("shoot_month".to_string(), shoot.format("%B").to_string()),
        ("shoot_date".to_string(), shoot.day().to_string()),
        ("shoot_location".to_string(), location),
        (
            "custom_message".to_string(),
            req.custom_message.clone().unwrap_or_default(),
        ),
    ];

    match &req.attachment {
        Some(file) => {
            params.push(("has_attachment".to_string(), "true".to_string()));
            params.push(("attachment_name".to_string(), file.filename.clone()));
        }
        None => params.push(("has_attachment".to_string(), "false".to_string())),
    }

    params
}

/// Sends a shoot reminder through the transactional email service.
/// An empty client email short-circuits locally; the service is never
/// contacted in that case.
pub fn send_reminder(config: &BusinessConfig, req: &ReminderRequest) -> Result<(), ReminderError> {
    if req.client_email.trim().is_empty() {
        return Err(ReminderError::MissingClientEmail);
    }

    let service = &config.email_service;
    let today = Local::now().date_naive();
    let mut form = Form::new()
        .text("service_id", service.service_id.clone())
        .text("template_id", service.template_id.clone())
        .text("user_id", service.public_key.clone());

    for (key, value) in template_params(config, req, today) {
        form = form.text(format!("template_params[{}]", key), value);
    }

    if let Some(file) = &req.attachment {
        let part = Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
        form = form.part("file", part);
    }

    let response = reqwest::blocking::Client::builder()
        .build()?
        .post(&service.api_url)
        .multipart(form)
        .send()?;

    if response.status().is_success() {
        Ok(())
    } else {
        let body = response.text().unwrap_or_default();
        Err(classify_failure(&body))
    }
}

fn classify_failure(body: &str) -> ReminderError {
    if body.contains("credit") || body.contains("quota") || body.contains("limit") {
        ReminderError::Delivery(
            "Email service credit balance is too low. Please check your account.".to_string(),
        )
    } else if body.contains("template") {
        ReminderError::Delivery(
            "Template not found or template error. Please check your email template configuration."
                .to_string(),
        )
    } else {
        ReminderError::Delivery(format!("Failed to send email. {}", body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str) -> ReminderRequest {
        ReminderRequest {
            client_email: email.to_string(),
            client_name: "Jane Doe".to_string(),
            shoot_date: NaiveDate::from_ymd_opt(2025, 5, 16)
                .and_then(|d| d.and_hms_opt(9, 0, 0)),
            shoot_location: Some("Memorial Mall".to_string()),
            custom_message: None,
            kind: ReminderKind::Invoice,
            attachment: None,
        }
    }

    fn get<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn empty_email_short_circuits_before_dispatch() {
        let config = BusinessConfig::default();
        let err = send_reminder(&config, &request("")).unwrap_err();
        assert!(matches!(err, ReminderError::MissingClientEmail));

        let err = send_reminder(&config, &request("   ")).unwrap_err();
        assert!(matches!(err, ReminderError::MissingClientEmail));
    }

    #[test]
    fn params_split_shoot_date_into_day_month_date() {
        let config = BusinessConfig::default();
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let params = template_params(&config, &request("jane@example.com"), today);

        assert_eq!(get(&params, "to_email"), "jane@example.com");
        assert_eq!(get(&params, "name"), "Jane Doe");
        assert_eq!(get(&params, "shoot_day"), "Friday");
        assert_eq!(get(&params, "shoot_month"), "May");
        assert_eq!(get(&params, "shoot_date"), "16");
        assert_eq!(get(&params, "shoot_location"), "Memorial Mall");
        assert_eq!(get(&params, "custom_message"), "");
        assert_eq!(get(&params, "has_attachment"), "false");
    }

    #[test]
    fn missing_shoot_date_falls_back_to_today() {
        let config = BusinessConfig::default();
        let mut req = request("jane@example.com");
        req.shoot_date = None;
        let today = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
        let params = template_params(&config, &req, today);

        assert_eq!(get(&params, "shoot_day"), "Thursday");
        assert_eq!(get(&params, "shoot_month"), "December");
        assert_eq!(get(&params, "shoot_date"), "25");
    }

    #[test]
    fn missing_location_uses_configured_default() {
        let config = BusinessConfig::default();
        let mut req = request("jane@example.com");
        req.shoot_location = None;
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let params = template_params(&config, &req, today);
        assert_eq!(get(&params, "shoot_location"), "Hovde Hall");
    }

    #[test]
    fn attachment_sets_name_param() {
        let config = BusinessConfig::default();
        let mut req = request("jane@example.com");
        req.attachment = Some(ExportedFile {
            bytes: vec![1, 2, 3],
            path: "out/Invoice-001.pdf".into(),
            filename: "Invoice-001.pdf".to_string(),
        });
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let params = template_params(&config, &req, today);

        assert_eq!(get(&params, "has_attachment"), "true");
        assert_eq!(get(&params, "attachment_name"), "Invoice-001.pdf");
    }

    #[test]
    fn failure_bodies_classify_into_user_messages() {
        match classify_failure("account credit exhausted") {
            ReminderError::Delivery(msg) => assert!(msg.contains("credit balance")),
            other => panic!("unexpected error: {:?}", other),
        }
        match classify_failure("template not found") {
            ReminderError::Delivery(msg) => assert!(msg.contains("Template")),
            other => panic!("unexpected error: {:?}", other),
        }
        match classify_failure("internal error") {
            ReminderError::Delivery(msg) => assert!(msg.contains("Failed to send email")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
