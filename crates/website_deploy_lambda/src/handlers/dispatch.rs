use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{error, info, warn};
use website_deploy_core::contract::{
    CustomResourceEvent, RequestType, ResourceProperties, ResponsePayload, ResponseStatus,
    CREATION_SUCCEEDED_MESSAGE, DELETION_SUCCEEDED_MESSAGE,
};

use crate::adapters::callback::ResponseSender;
use crate::adapters::object_store::AssetStore;
use crate::config::HandlerConfig;
use crate::handlers::copy::deploy_assets;
use crate::handlers::error::DeploymentError;
use crate::handlers::notify::{send_response, NotifyError};

/// Run metadata supplied by the Lambda environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    pub log_stream_name: String,
}

/// Parses a raw custom-resource request and handles it.
///
/// A request that does not match the expected shape is still answered with
/// FAILED as long as it carries a `ResponseURL`.
pub fn handle_raw_event(
    payload: Value,
    context: &InvocationContext,
    config: &HandlerConfig,
    env_lookup: &dyn Fn(&str) -> Option<String>,
    store: &impl AssetStore,
    sender: &impl ResponseSender,
) -> Result<ResponsePayload, NotifyError> {
    match serde_json::from_value::<CustomResourceEvent>(payload.clone()) {
        Ok(event) => {
            handle_custom_resource_event(&event, context, config, env_lookup, store, sender)
        }
        Err(parse_error) => {
            let Some(event) = salvage_event(&payload) else {
                error!(event = "request_rejected", error = %parse_error);
                return Err(NotifyError::NoCallbackTarget(parse_error.to_string()));
            };
            warn!(event = "request_malformed", error = %parse_error);
            let failure = DeploymentError::Fault(parse_error.to_string());
            send_response(
                &event,
                &context.log_stream_name,
                ResponseStatus::Failed,
                &failure.callback_message(),
                sender,
            )
        }
    }
}

/// Handles one lifecycle event and sends exactly one response for it.
///
/// Every failure below this point, panics included, is turned into a FAILED
/// response; only a failure to deliver that response is returned.
pub fn handle_custom_resource_event(
    event: &CustomResourceEvent,
    context: &InvocationContext,
    config: &HandlerConfig,
    env_lookup: &dyn Fn(&str) -> Option<String>,
    store: &impl AssetStore,
    sender: &impl ResponseSender,
) -> Result<ResponsePayload, NotifyError> {
    info!(
        event = "request_received",
        request_type = ?event.request_type,
        stack_id = %event.stack_id,
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
        log_stream = %context.log_stream_name,
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch(event, config, env_lookup, store)
    }))
    .unwrap_or_else(|payload| Err(DeploymentError::Fault(panic_description(payload))));

    let (status, message) = match outcome {
        Ok(message) => (ResponseStatus::Success, message.to_string()),
        Err(failure) => {
            error!(event = "request_failed", error = %failure);
            (ResponseStatus::Failed, failure.callback_message())
        }
    };

    send_response(event, &context.log_stream_name, status, &message, sender)
}

fn dispatch(
    event: &CustomResourceEvent,
    config: &HandlerConfig,
    env_lookup: &dyn Fn(&str) -> Option<String>,
    store: &impl AssetStore,
) -> Result<&'static str, DeploymentError> {
    match event.request_type() {
        Some(request_type @ (RequestType::Create | RequestType::Update)) => {
            info!(event = "deploy_requested", request_type = request_type.as_str());
            let summary = deploy_assets(event, config, env_lookup, store)?;
            info!(
                event = "deploy_completed",
                request_type = request_type.as_str(),
                destination_bucket = %summary.destination_bucket,
                files_copied = summary.files_copied,
                runtime_config_replaced = summary.runtime_config_replaced,
            );
            Ok(CREATION_SUCCEEDED_MESSAGE)
        }
        Some(RequestType::Delete) => {
            info!(event = "delete_requested");
            Ok(DELETION_SUCCEEDED_MESSAGE)
        }
        Some(RequestType::Other(name)) => Err(DeploymentError::UnexpectedRequestType(name)),
        None => Err(DeploymentError::Fault(
            "missing field `RequestType`".to_string(),
        )),
    }
}

fn salvage_event(payload: &Value) -> Option<CustomResourceEvent> {
    let field = |name: &str| {
        payload
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Some(CustomResourceEvent {
        request_type: field("RequestType"),
        stack_id: field("StackId").unwrap_or_default(),
        request_id: field("RequestId").unwrap_or_default(),
        logical_resource_id: field("LogicalResourceId").unwrap_or_default(),
        response_url: field("ResponseURL")?,
        resource_properties: ResourceProperties::default(),
    })
}

fn panic_description(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "handler panicked".to_string()
}
