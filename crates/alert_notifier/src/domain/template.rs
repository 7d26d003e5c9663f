use crate::domain::{AlertEmail, AlertError, Result};
use askama::Template;
use common::domain::MotionAlert;

/// HTML body of a motion alert; values are escaped on render
#[derive(Template)]
#[template(path = "motion_alert.html")]
struct MotionAlertTemplate<'a> {
    name: &'a str,
    external_id: &'a str,
    status: &'a str,
}

/// Build the alert email for a motion alert
pub fn compose_alert_email(sender_email: &str, alert: &MotionAlert) -> Result<AlertEmail> {
    let html_body = MotionAlertTemplate {
        name: &alert.device_name,
        external_id: &alert.device_external_id,
        status: &alert.status,
    }
    .render()
    .map_err(|e| AlertError::Compose(e.to_string()))?;

    Ok(AlertEmail {
        from: sender_email.to_string(),
        to: alert.receiver_email.clone(),
        subject: format!(
            "Motion alert: {} reported {}!",
            alert.device_name, alert.status
        ),
        html_body,
    })
}
