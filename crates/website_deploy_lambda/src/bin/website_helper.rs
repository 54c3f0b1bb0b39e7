use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use website_deploy_core::storage_keys::copy_source;
use website_deploy_lambda::adapters::callback::HttpResponseSender;
use website_deploy_lambda::adapters::object_store::AssetStore;
use website_deploy_lambda::config::{ClientConfig, HandlerConfig, CLIENT_CONFIG_VAR};
use website_deploy_lambda::handlers::dispatch::{handle_raw_event, InvocationContext};

struct S3AssetStore {
    s3_client: aws_sdk_s3::Client,
}

impl AssetStore for S3AssetStore {
    fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<(), String> {
        let source = copy_source(source_bucket, source_key);
        let bucket = destination_bucket.to_string();
        let object_key = destination_key.to_string();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .copy_object()
                    .copy_source(source)
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to copy object in s3: {error}"))
            })
        })
    }

    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }
}

struct RuntimeDependencies {
    store: S3AssetStore,
    sender: HttpResponseSender,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<Value, Error> {
    let context = InvocationContext {
        log_stream_name: event.context.env_config.log_stream.clone(),
    };
    let config = HandlerConfig::from_lookup(env_var);

    let payload = handle_raw_event(
        event.payload,
        &context,
        &config,
        &env_var,
        &deps.store,
        &deps.sender,
    )
    .map_err(|error| Error::from(error.to_string()))?;

    serde_json::to_value(payload)
        .map_err(|error| Error::from(format!("failed to serialize response payload: {error}")))
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn load_client_config() -> ClientConfig {
    let Some(raw) = env_var(CLIENT_CONFIG_VAR) else {
        return ClientConfig::default();
    };

    match ClientConfig::parse(&raw) {
        Ok(config) => {
            if let Some(extra) = config.user_agent_extra.as_deref() {
                info!(event = "client_user_agent", user_agent_extra = extra);
            }
            config
        }
        Err(parse_error) => {
            warn!(
                event = "client_config_invalid",
                variable = CLIENT_CONFIG_VAR,
                error = %parse_error,
            );
            ClientConfig::default()
        }
    }
}

async fn build_s3_client(client_config: &ClientConfig) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = client_config.region_name.clone() {
        loader = loader.region(Region::new(region));
    }
    if let Some(retry_config) = client_config.retry_config() {
        loader = loader.retry_config(retry_config);
    }
    if let Some(timeout_config) = client_config.timeout_config() {
        loader = loader.timeout_config(timeout_config);
    }

    let aws_config = loader.load().await;
    aws_sdk_s3::Client::new(&aws_config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let client_config = load_client_config();
    let http_client = reqwest::Client::builder().build().map_err(|error| {
        error!(event = "http_client_init_failed", error = %error);
        Error::from(format!("failed to build callback http client: {error}"))
    })?;
    let deps = RuntimeDependencies {
        store: S3AssetStore {
            s3_client: build_s3_client(&client_config).await,
        },
        sender: HttpResponseSender::new(http_client),
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
