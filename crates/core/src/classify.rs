//! Classify transport failures into retry-policy failure kinds.
//!
//! Classification is a decision table over failure metadata (category code
//! plus message text), evaluated in order with first match winning. It is
//! pure, deterministic, and total: anything unmapped is
//! [`FailureKind::Unknown`], which the dispatcher retries conservatively.

use crate::error::FailureKind;
use crate::transport::TransportError;

/// Provider category code for throttling conditions.
const THROTTLING_CODE: &str = "Throttling";
/// Provider category code for authorization failures.
const ACCESS_DENIED_CODE: &str = "AccessDenied";
/// Throttling message when the rolling-window quota is exhausted.
const DAILY_QUOTA_MESSAGE: &str = "Daily message quota exceeded.";
/// Throttling message when the instantaneous rate was exceeded.
const SEND_RATE_MESSAGE: &str = "Maximum sending rate exceeded.";
/// Message prefix when the environment has no usable credentials.
const NO_CREDENTIALS_PREFIX: &str = "Unable to find credentials";

/// Map an opaque transport failure onto the closed [`FailureKind`] set.
pub fn classify(failure: &TransportError) -> FailureKind {
    match failure {
        TransportError::Service { code, message } => match code.as_str() {
            THROTTLING_CODE if message == DAILY_QUOTA_MESSAGE => FailureKind::DailyQuotaExceeded,
            THROTTLING_CODE if message == SEND_RATE_MESSAGE => FailureKind::SendRateExceeded,
            ACCESS_DENIED_CODE => FailureKind::AccessDenied,
            _ => FailureKind::Unknown,
        },
        TransportError::Rejected { .. } => FailureKind::MessageRejected,
        TransportError::Call { message } if message.starts_with(NO_CREDENTIALS_PREFIX) => {
            FailureKind::NoCredentials
        }
        TransportError::Call { .. } => FailureKind::Unknown,
    }
}
