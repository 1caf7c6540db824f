//! Outbound message model.

use serde::{Deserialize, Serialize};

/// An outbound email.
///
/// This is payload as far as the dispatch core is concerned: content
/// validation and defaulting (e.g. filling in a configured `from` address)
/// belong to the caller, before the request reaches [`crate::MailSender`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    /// Sender address.
    #[serde(default)]
    pub from: Option<String>,
    /// Recipient addresses.
    #[serde(default)]
    pub to: Vec<String>,
    /// Reply-to address, if different from the sender.
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

impl EmailRequest {
    /// Convenience constructor for the common single-recipient case.
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            from: None,
            to: vec![to.into()],
            reply_to: None,
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trips_through_json() {
        let request = EmailRequest {
            from: Some("noreply@example.com".into()),
            ..EmailRequest::new("user@example.com", "Welcome", "<p>Hello</p>")
        };

        let json = serde_json::to_string(&request).expect("serialize");
        let back: EmailRequest = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(back, request);
    }
}
