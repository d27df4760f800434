use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::application::ports::ReportMailer;
use crate::report::EmailReport;

/// SendGrid v3 mail/send 요청 본문
#[derive(Debug, Serialize)]
pub struct SendGridMessage {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub subject: String,
    pub content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MailContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl From<&EmailReport> for SendGridMessage {
    fn from(report: &EmailReport) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: report.to.clone(),
                }],
            }],
            from: EmailAddress {
                email: report.from.clone(),
            },
            subject: report.subject.clone(),
            content: vec![MailContent {
                content_type: "text/html".to_string(),
                value: report.html.clone(),
            }],
        }
    }
}

/// SendGrid 클라이언트
#[derive(Clone)]
pub struct SendGridClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SendGridClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .context("Failed to create HTTP client")?,
            api_key,
            base_url: base_url.into(),
        })
    }

    /// 메일 한 통 전송 (재시도 없음)
    pub async fn send_message(&self, message: &SendGridMessage) -> Result<()> {
        debug!("Sending report email via SendGrid");

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await
            .context("Failed to reach SendGrid")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("SendGrid rejected report email: {} - {}", status, body);
            anyhow::bail!("SendGrid returned {}: {}", status, body);
        }

        debug!("Report email accepted");
        Ok(())
    }
}

#[async_trait]
impl ReportMailer for SendGridClient {
    async fn send_report(&self, email: &EmailReport) -> Result<()> {
        self.send_message(&SendGridMessage::from(email)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let report = EmailReport {
            to: "ops@example.com".to_string(),
            from: "bot@example.com".to_string(),
            subject: "Static Web Apps - daily GitHub workflows report".to_string(),
            html: "TOTAL: 1 (100.0%)<br />".to_string(),
        };

        let json = serde_json::to_value(SendGridMessage::from(&report)).unwrap();
        assert_eq!(json["personalizations"][0]["to"][0]["email"], "ops@example.com");
        assert_eq!(json["from"]["email"], "bot@example.com");
        assert_eq!(json["subject"], "Static Web Apps - daily GitHub workflows report");
        assert_eq!(json["content"][0]["type"], "text/html");
        assert_eq!(json["content"][0]["value"], "TOTAL: 1 (100.0%)<br />");
    }
}
