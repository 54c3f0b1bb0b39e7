use website_deploy_core::contract::{
    PropertyError, FAULT_MESSAGE_PREFIX, MISSING_PROPERTIES_MESSAGE, OVERWRITE_FAILED_MESSAGE,
    UNEXPECTED_EVENT_MESSAGE,
};
use website_deploy_core::manifest::ManifestError;

/// Terminal failure of one invocation. Each variant maps to the message
/// reported back to CloudFormation.
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error(transparent)]
    MissingProperty(#[from] PropertyError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("failed to copy '{key}' into the website bucket: {message}")]
    Copy { key: String, message: String },
    #[error("failed to overwrite '{key}' after variable replacement: {message}")]
    Overwrite { key: String, message: String },
    #[error("unexpected request type: {0}")]
    UnexpectedRequestType(String),
    #[error("{0}")]
    Fault(String),
}

impl DeploymentError {
    pub fn callback_message(&self) -> String {
        match self {
            Self::MissingProperty(_) => MISSING_PROPERTIES_MESSAGE.to_string(),
            Self::Manifest(_) | Self::Copy { .. } | Self::UnexpectedRequestType(_) => {
                UNEXPECTED_EVENT_MESSAGE.to_string()
            }
            Self::Overwrite { .. } => OVERWRITE_FAILED_MESSAGE.to_string(),
            Self::Fault(description) => format!("{FAULT_MESSAGE_PREFIX}: {description}"),
        }
    }
}
