//! High-level sending facade.
//!
//! [`MailSender`] binds a concrete transport to the shared limiters and the
//! configured default retry budget, so application code sends with one call
//! instead of assembling a dispatch closure each time.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::DispatchConfig;
use crate::dispatch::Dispatcher;
use crate::error::DispatchError;
use crate::limiter::LimiterPair;
use crate::request::EmailRequest;
use crate::transport::{MailTransport, SendAck};

/// Sends email through a transport with the full resilience policy applied.
pub struct MailSender {
    transport: Arc<dyn MailTransport>,
    dispatcher: Dispatcher,
    max_retries: u32,
}

impl MailSender {
    /// Pair a transport with the shared limiters.
    pub fn new(
        transport: Arc<dyn MailTransport>,
        limiters: Arc<LimiterPair>,
        config: &DispatchConfig,
    ) -> Self {
        Self { transport, dispatcher: Dispatcher::new(limiters), max_retries: config.max_retries }
    }

    /// Send with the configured default retry budget.
    pub async fn send_email(
        &self,
        request: &EmailRequest,
        cancel: &CancellationToken,
    ) -> Result<SendAck, DispatchError> {
        self.send_email_with_retries(request, self.max_retries, cancel).await
    }

    /// Send with an explicit retry budget.
    #[instrument(
        name = "send_email",
        skip(self, request, cancel),
        fields(subject = %request.subject)
    )]
    pub async fn send_email_with_retries(
        &self,
        request: &EmailRequest,
        max_retries: u32,
        cancel: &CancellationToken,
    ) -> Result<SendAck, DispatchError> {
        let transport = Arc::clone(&self.transport);
        self.dispatcher
            .dispatch(
                || {
                    let transport = Arc::clone(&transport);
                    async move { transport.send(request).await }
                },
                max_retries,
                cancel,
            )
            .await
    }
}

impl std::fmt::Debug for MailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSender").field("max_retries", &self.max_retries).finish_non_exhaustive()
    }
}
