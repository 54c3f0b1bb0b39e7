use serde::{Deserialize, Serialize};

pub const CREATION_SUCCEEDED_MESSAGE: &str = "Resource creation successful!";
pub const DELETION_SUCCEEDED_MESSAGE: &str = "Resource deletion successful!";
pub const UNEXPECTED_EVENT_MESSAGE: &str = "Unexpected event received from CloudFormation";
pub const MISSING_PROPERTIES_MESSAGE: &str =
    "Failed to retrieve required values from the CloudFormation event";
pub const OVERWRITE_FAILED_MESSAGE: &str = "Failed to write file to s3 after variable replacement";
pub const FAULT_MESSAGE_PREFIX: &str = "Exception during processing";
pub const REASON_PREFIX: &str = "See the details in CloudWatch Log Stream: ";

pub const WEBSITE_CODE_BUCKET: &str = "WebsiteCodeBucket";
pub const WEBSITE_CODE_PREFIX: &str = "WebsiteCodePrefix";
pub const DEPLOYMENT_BUCKET: &str = "DeploymentBucket";

/// CloudFormation custom-resource lifecycle request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomResourceEvent {
    #[serde(rename = "RequestType", default)]
    pub request_type: Option<String>,
    #[serde(rename = "StackId", default)]
    pub stack_id: String,
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId", default)]
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    #[serde(rename = "ResourceProperties", default)]
    pub resource_properties: ResourceProperties,
}

impl CustomResourceEvent {
    pub fn request_type(&self) -> Option<RequestType> {
        self.request_type.as_deref().map(RequestType::parse)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceProperties {
    #[serde(rename = "WebsiteCodeBucket", default)]
    pub website_code_bucket: Option<String>,
    #[serde(rename = "WebsiteCodePrefix", default)]
    pub website_code_prefix: Option<String>,
    #[serde(rename = "DeploymentBucket", default)]
    pub deployment_bucket: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl RequestType {
    pub fn parse(value: &str) -> Self {
        match value {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing resource property: {property}")]
pub struct PropertyError {
    pub property: &'static str,
}

/// Source and destination of one website deployment, resolved from the
/// event's resource properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    pub source_bucket: String,
    pub source_prefix: String,
    pub destination_bucket: String,
}

impl DeploymentTarget {
    pub fn from_properties(properties: &ResourceProperties) -> Result<Self, PropertyError> {
        let source_bucket = required(&properties.website_code_bucket, WEBSITE_CODE_BUCKET)?;
        let source_prefix = required(&properties.website_code_prefix, WEBSITE_CODE_PREFIX)?;
        let deployment_bucket = required(&properties.deployment_bucket, DEPLOYMENT_BUCKET)?;

        Ok(Self {
            source_bucket: source_bucket.to_string(),
            source_prefix: source_prefix.to_string(),
            destination_bucket: bucket_from_domain(deployment_bucket).to_string(),
        })
    }
}

fn required<'a>(
    value: &'a Option<String>,
    property: &'static str,
) -> Result<&'a str, PropertyError> {
    value.as_deref().ok_or(PropertyError { property })
}

/// Strips a website-endpoint domain down to its bucket name:
/// `my-site.s3-website-us-west-2.amazonaws.com` becomes `my-site`.
pub fn bucket_from_domain(domain: &str) -> &str {
    domain.split('.').next().unwrap_or(domain)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseData {
    #[serde(rename = "Message")]
    pub message: String,
}

/// Body PUT to the CloudFormation callback URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponsePayload {
    #[serde(rename = "Status")]
    pub status: ResponseStatus,
    #[serde(rename = "Reason")]
    pub reason: String,
    #[serde(rename = "PhysicalResourceId")]
    pub physical_resource_id: String,
    #[serde(rename = "StackId")]
    pub stack_id: String,
    #[serde(rename = "RequestId")]
    pub request_id: String,
    #[serde(rename = "LogicalResourceId")]
    pub logical_resource_id: String,
    #[serde(rename = "Data")]
    pub data: ResponseData,
}

impl ResponsePayload {
    pub fn new(
        event: &CustomResourceEvent,
        log_stream_name: &str,
        status: ResponseStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            reason: format!("{REASON_PREFIX}{log_stream_name}"),
            physical_resource_id: log_stream_name.to_string(),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: ResponseData {
                message: message.into(),
            },
        }
    }
}
