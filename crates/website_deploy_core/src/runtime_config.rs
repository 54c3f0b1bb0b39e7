use serde::{Deserialize, Serialize};

pub const SEARCH_ENDPOINT_VAR: &str = "SearchEndpoint";
pub const WORKFLOW_ENDPOINT_VAR: &str = "WorkflowEndpoint";
pub const DATAPLANE_ENDPOINT_VAR: &str = "DataplaneEndpoint";
pub const DATAPLANE_BUCKET_VAR: &str = "DataplaneBucket";
pub const AWS_REGION_VAR: &str = "AwsRegion";
pub const USER_POOL_ID_VAR: &str = "UserPoolId";
pub const POOL_CLIENT_ID_VAR: &str = "PoolClientId";
pub const IDENTITY_POOL_ID_VAR: &str = "IdentityPoolId";

pub const BUNDLE_VARIABLES: [&str; 8] = [
    SEARCH_ENDPOINT_VAR,
    WORKFLOW_ENDPOINT_VAR,
    DATAPLANE_ENDPOINT_VAR,
    DATAPLANE_BUCKET_VAR,
    AWS_REGION_VAR,
    USER_POOL_ID_VAR,
    POOL_CLIENT_ID_VAR,
    IDENTITY_POOL_ID_VAR,
];

/// Values written into the web app's `runtimeConfig.json`.
///
/// Field order matches the serialized key order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuntimeConfigBundle {
    #[serde(rename = "SEARCH_ENDPOINT")]
    pub search_endpoint: String,
    #[serde(rename = "WORKFLOW_API_ENDPOINT")]
    pub workflow_api_endpoint: String,
    #[serde(rename = "DATAPLANE_API_ENDPOINT")]
    pub dataplane_api_endpoint: String,
    #[serde(rename = "DATAPLANE_BUCKET")]
    pub dataplane_bucket: String,
    #[serde(rename = "AWS_REGION")]
    pub aws_region: String,
    #[serde(rename = "USER_POOL_ID")]
    pub user_pool_id: String,
    #[serde(rename = "USER_POOL_CLIENT_ID")]
    pub user_pool_client_id: String,
    #[serde(rename = "IDENTITY_POOL_ID")]
    pub identity_pool_id: String,
}

impl RuntimeConfigBundle {
    /// Builds the bundle when every variable resolves, otherwise `None`.
    /// A partial set is treated the same as no set at all.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        Some(Self {
            search_endpoint: format!("https://{}", lookup(SEARCH_ENDPOINT_VAR)?),
            workflow_api_endpoint: lookup(WORKFLOW_ENDPOINT_VAR)?,
            dataplane_api_endpoint: lookup(DATAPLANE_ENDPOINT_VAR)?,
            dataplane_bucket: lookup(DATAPLANE_BUCKET_VAR)?,
            aws_region: lookup(AWS_REGION_VAR)?,
            user_pool_id: lookup(USER_POOL_ID_VAR)?,
            user_pool_client_id: lookup(POOL_CLIENT_ID_VAR)?,
            identity_pool_id: lookup(IDENTITY_POOL_ID_VAR)?,
        })
    }

    /// Names of bundle variables the lookup cannot resolve.
    pub fn missing_variables(lookup: impl Fn(&str) -> Option<String>) -> Vec<&'static str> {
        BUNDLE_VARIABLES
            .into_iter()
            .filter(|name| lookup(name).is_none())
            .collect()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
