use tracing::{error, info};
use website_deploy_core::contract::{CustomResourceEvent, ResponsePayload, ResponseStatus};

use crate::adapters::callback::ResponseSender;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("failed to serialize response payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to deliver response to CloudFormation: {0}")]
    Delivery(String),
    #[error("request carries no ResponseURL to report to: {0}")]
    NoCallbackTarget(String),
}

/// Sends the one terminal response for an invocation.
pub fn send_response(
    event: &CustomResourceEvent,
    log_stream_name: &str,
    status: ResponseStatus,
    message: &str,
    sender: &impl ResponseSender,
) -> Result<ResponsePayload, NotifyError> {
    let payload = ResponsePayload::new(event, log_stream_name, status, message);
    let body = serde_json::to_vec(&payload)?;

    info!(
        event = "response_prepared",
        response_url = %event.response_url,
        response_body = %String::from_utf8_lossy(&body),
    );

    match sender.send_response(&event.response_url, &body) {
        Ok(receipt) => {
            info!(
                event = "response_delivered",
                status_code = receipt.status_code,
                status_message = %receipt.status_message,
            );
            Ok(payload)
        }
        Err(message) => {
            error!(
                event = "response_delivery_failed",
                response_url = %event.response_url,
                error = %message,
            );
            Err(NotifyError::Delivery(message))
        }
    }
}
