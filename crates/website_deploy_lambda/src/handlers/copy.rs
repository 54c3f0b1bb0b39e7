use std::time::Instant;

use tracing::{error, info, warn};
use website_deploy_core::contract::{CustomResourceEvent, DeploymentTarget};
use website_deploy_core::manifest::{Manifest, RUNTIME_CONFIG_KEY};
use website_deploy_core::runtime_config::RuntimeConfigBundle;
use website_deploy_core::storage_keys::source_object_key;

use crate::adapters::object_store::AssetStore;
use crate::config::HandlerConfig;
use crate::handlers::error::DeploymentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentSummary {
    pub destination_bucket: String,
    pub files_copied: usize,
    pub runtime_config_replaced: bool,
}

/// Copies every manifest entry from the source prefix into the website
/// bucket, replacing `runtimeConfig.json` when the runtime configuration
/// bundle is complete.
///
/// Stops at the first failed copy or overwrite; objects already copied stay.
pub fn deploy_assets(
    event: &CustomResourceEvent,
    config: &HandlerConfig,
    env_lookup: &dyn Fn(&str) -> Option<String>,
    store: &impl AssetStore,
) -> Result<DeploymentSummary, DeploymentError> {
    let started_at = Instant::now();
    let target = DeploymentTarget::from_properties(&event.resource_properties).map_err(|error| {
        error!(
            event = "missing_resource_property",
            property = error.property,
        );
        error
    })?;

    let bundle = resolve_runtime_config(env_lookup);
    let runtime_config_body = bundle
        .as_ref()
        .map(RuntimeConfigBundle::to_json_bytes)
        .transpose()
        .map_err(|error| DeploymentError::Fault(error.to_string()))?;

    let manifest = Manifest::load(&config.manifest_path).map_err(|manifest_error| {
        error!(
            event = "manifest_load_failed",
            manifest_path = %config.manifest_path.display(),
            error = %manifest_error,
        );
        manifest_error
    })?;

    if manifest.is_empty() {
        warn!(
            event = "manifest_empty",
            manifest_path = %config.manifest_path.display(),
        );
    }

    info!(
        event = "copy_started",
        source_bucket = %target.source_bucket,
        source_prefix = %target.source_prefix,
        destination_bucket = %target.destination_bucket,
        manifest_entries = manifest.len(),
    );

    let mut runtime_config_replaced = false;
    for key in manifest.keys() {
        let source_key = source_object_key(&target.source_prefix, key);
        store
            .copy_object(
                &target.source_bucket,
                &source_key,
                &target.destination_bucket,
                key,
            )
            .map_err(|message| {
                error!(
                    event = "copy_failed",
                    source = %format!("s3://{}/{source_key}", target.source_bucket),
                    key = %key,
                    error = %message,
                );
                DeploymentError::Copy {
                    key: key.clone(),
                    message,
                }
            })?;
        info!(
            event = "file_copied",
            source = %format!("s3://{}/{source_key}", target.source_bucket),
            key = %key,
        );

        if key != RUNTIME_CONFIG_KEY {
            continue;
        }
        if let Some(body) = runtime_config_body.as_deref() {
            store
                .put_object(&target.destination_bucket, key, body)
                .map_err(|message| {
                    error!(
                        event = "runtime_config_write_failed",
                        key = %key,
                        error = %message,
                    );
                    DeploymentError::Overwrite {
                        key: key.clone(),
                        message,
                    }
                })?;
            runtime_config_replaced = true;
            info!(event = "runtime_config_replaced", key = %key);
        }
    }

    let duration_ms = started_at.elapsed().as_millis() as u64;
    info!(
        event = "copy_completed",
        destination_bucket = %target.destination_bucket,
        files_copied = manifest.len(),
        runtime_config_replaced,
        duration_ms,
    );

    Ok(DeploymentSummary {
        destination_bucket: target.destination_bucket,
        files_copied: manifest.len(),
        runtime_config_replaced,
    })
}

fn resolve_runtime_config(
    env_lookup: &dyn Fn(&str) -> Option<String>,
) -> Option<RuntimeConfigBundle> {
    match RuntimeConfigBundle::from_lookup(env_lookup) {
        Some(bundle) => {
            info!(event = "runtime_config_resolved", bundle = ?bundle);
            Some(bundle)
        }
        None => {
            info!(
                event = "runtime_config_skipped",
                missing = ?RuntimeConfigBundle::missing_variables(env_lookup),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::io::Write;
    use std::sync::Mutex;

    use serde_json::{json, Value};
    use tempfile::NamedTempFile;
    use website_deploy_core::runtime_config::{BUNDLE_VARIABLES, USER_POOL_ID_VAR};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum StoreCall {
        Copy { source: String, destination: String },
        Put { destination: String },
    }

    struct InMemoryStore {
        objects: Mutex<HashMap<(String, String), Vec<u8>>>,
        calls: Mutex<Vec<StoreCall>>,
        denied_copy_keys: HashSet<String>,
        deny_puts: bool,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                denied_copy_keys: HashSet::new(),
                deny_puts: false,
            }
        }

        fn seed_object(&self, bucket: &str, key: &str, body: &[u8]) {
            self.objects
                .lock()
                .expect("poisoned mutex")
                .insert((bucket.to_string(), key.to_string()), body.to_vec());
        }

        fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
            self.objects
                .lock()
                .expect("poisoned mutex")
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }

        fn calls(&self) -> Vec<StoreCall> {
            self.calls.lock().expect("poisoned mutex").clone()
        }
    }

    impl AssetStore for InMemoryStore {
        fn copy_object(
            &self,
            source_bucket: &str,
            source_key: &str,
            destination_bucket: &str,
            destination_key: &str,
        ) -> Result<(), String> {
            self.calls.lock().expect("poisoned mutex").push(StoreCall::Copy {
                source: format!("{source_bucket}/{source_key}"),
                destination: format!("{destination_bucket}/{destination_key}"),
            });
            if self.denied_copy_keys.contains(destination_key) {
                return Err(format!("AccessDenied: {destination_key}"));
            }

            let body = self
                .body(source_bucket, source_key)
                .ok_or_else(|| format!("NoSuchKey: {source_key}"))?;
            self.seed_object(destination_bucket, destination_key, &body);
            Ok(())
        }

        fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
            self.calls.lock().expect("poisoned mutex").push(StoreCall::Put {
                destination: format!("{bucket}/{key}"),
            });
            if self.deny_puts {
                return Err("AccessDenied".to_string());
            }
            self.seed_object(bucket, key, body);
            Ok(())
        }
    }

    const MANIFEST_KEYS: [&str; 3] = ["index.html", "runtimeConfig.json", "static/js/app.js"];

    fn write_manifest(keys: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file should open");
        file.write_all(
            serde_json::to_string(keys)
                .expect("manifest should serialize")
                .as_bytes(),
        )
        .expect("manifest should write");
        file
    }

    fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        for key in MANIFEST_KEYS {
            store.seed_object(
                "source-bucket",
                &format!("website/{key}"),
                format!("source:{key}").as_bytes(),
            );
        }
        store
    }

    fn create_event() -> CustomResourceEvent {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ResponseURL": "https://callback.example.com/response",
            "StackId": "stack-1",
            "RequestId": "request-1",
            "LogicalResourceId": "CopyWebSource",
            "ResourceProperties": {
                "WebsiteCodeBucket": "source-bucket",
                "WebsiteCodePrefix": "website",
                "DeploymentBucket": "my-site.s3-website-us-west-2.amazonaws.com"
            }
        }))
        .expect("event should parse")
    }

    fn full_environment() -> HashMap<String, String> {
        BUNDLE_VARIABLES
            .iter()
            .map(|name| (name.to_string(), format!("value-{name}")))
            .collect()
    }

    fn config_for(manifest: &NamedTempFile) -> HandlerConfig {
        HandlerConfig {
            manifest_path: manifest.path().to_path_buf(),
        }
    }

    #[test]
    fn copies_every_manifest_key_verbatim_without_bundle() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let store = seeded_store();

        let summary = deploy_assets(&create_event(), &config_for(&manifest), &|_| None, &store)
            .expect("deployment should succeed");

        assert_eq!(summary.destination_bucket, "my-site");
        assert_eq!(summary.files_copied, 3);
        assert!(!summary.runtime_config_replaced);
        for key in MANIFEST_KEYS {
            assert_eq!(
                store.body("my-site", key),
                Some(format!("source:{key}").into_bytes())
            );
        }
        assert!(store
            .calls()
            .iter()
            .all(|call| matches!(call, StoreCall::Copy { .. })));
    }

    #[test]
    fn copies_in_manifest_order_from_prefixed_source() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let store = seeded_store();

        deploy_assets(&create_event(), &config_for(&manifest), &|_| None, &store)
            .expect("deployment should succeed");

        let sources: Vec<String> = store
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Copy { source, .. } => Some(source),
                StoreCall::Put { .. } => None,
            })
            .collect();
        assert_eq!(
            sources,
            vec![
                "source-bucket/website/index.html",
                "source-bucket/website/runtimeConfig.json",
                "source-bucket/website/static/js/app.js",
            ]
        );
    }

    #[test]
    fn replaces_runtime_config_right_after_its_copy() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let store = seeded_store();
        let env = full_environment();

        let summary = deploy_assets(
            &create_event(),
            &config_for(&manifest),
            &|name| env.get(name).cloned(),
            &store,
        )
        .expect("deployment should succeed");

        assert!(summary.runtime_config_replaced);
        assert_eq!(
            store.calls()[1..3],
            [
                StoreCall::Copy {
                    source: "source-bucket/website/runtimeConfig.json".to_string(),
                    destination: "my-site/runtimeConfig.json".to_string(),
                },
                StoreCall::Put {
                    destination: "my-site/runtimeConfig.json".to_string(),
                },
            ]
        );

        let written: Value = serde_json::from_slice(
            &store
                .body("my-site", "runtimeConfig.json")
                .expect("runtime config should exist"),
        )
        .expect("runtime config should be json");
        assert_eq!(written["SEARCH_ENDPOINT"], "https://value-SearchEndpoint");
        assert_eq!(written["USER_POOL_CLIENT_ID"], "value-PoolClientId");
        assert_eq!(written.as_object().map(|object| object.len()), Some(8));
        assert_eq!(
            store.body("my-site", "index.html"),
            Some(b"source:index.html".to_vec())
        );
    }

    #[test]
    fn partial_environment_keeps_source_runtime_config() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let store = seeded_store();
        let mut env = full_environment();
        env.remove(USER_POOL_ID_VAR);

        let summary = deploy_assets(
            &create_event(),
            &config_for(&manifest),
            &|name| env.get(name).cloned(),
            &store,
        )
        .expect("deployment should succeed");

        assert!(!summary.runtime_config_replaced);
        assert_eq!(
            store.body("my-site", "runtimeConfig.json"),
            Some(b"source:runtimeConfig.json".to_vec())
        );
    }

    #[test]
    fn missing_property_attempts_no_copy() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let store = seeded_store();
        let mut event = create_event();
        event.resource_properties.website_code_bucket = None;

        let error = deploy_assets(&event, &config_for(&manifest), &|_| None, &store)
            .expect_err("missing bucket should fail");

        assert!(matches!(error, DeploymentError::MissingProperty(_)));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn missing_manifest_attempts_no_copy() {
        let dir = tempfile::tempdir().expect("temp dir should open");
        let store = seeded_store();
        let config = HandlerConfig {
            manifest_path: dir.path().join("webapp-manifest.json"),
        };

        let error = deploy_assets(&create_event(), &config, &|_| None, &store)
            .expect_err("missing manifest should fail");

        assert!(matches!(error, DeploymentError::Manifest(_)));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn copy_failure_skips_remaining_keys_and_keeps_earlier_copies() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let mut store = seeded_store();
        store.denied_copy_keys.insert("runtimeConfig.json".to_string());

        let error = deploy_assets(&create_event(), &config_for(&manifest), &|_| None, &store)
            .expect_err("denied copy should fail");

        assert!(matches!(error, DeploymentError::Copy { ref key, .. } if key == "runtimeConfig.json"));
        assert_eq!(store.calls().len(), 2);
        assert!(store.body("my-site", "index.html").is_some());
        assert!(store.body("my-site", "static/js/app.js").is_none());
    }

    #[test]
    fn overwrite_failure_stops_before_later_keys() {
        let manifest = write_manifest(&MANIFEST_KEYS);
        let mut store = seeded_store();
        store.deny_puts = true;
        let env = full_environment();

        let error = deploy_assets(
            &create_event(),
            &config_for(&manifest),
            &|name| env.get(name).cloned(),
            &store,
        )
        .expect_err("denied put should fail");

        assert!(matches!(error, DeploymentError::Overwrite { .. }));
        assert_eq!(store.calls().len(), 3);
        assert!(store.body("my-site", "static/js/app.js").is_none());
    }

    #[test]
    fn bundle_without_runtime_config_key_writes_nothing_extra() {
        let manifest = write_manifest(&["index.html"]);
        let store = seeded_store();
        let env = full_environment();

        let summary = deploy_assets(
            &create_event(),
            &config_for(&manifest),
            &|name| env.get(name).cloned(),
            &store,
        )
        .expect("deployment should succeed");

        assert!(!summary.runtime_config_replaced);
        assert_eq!(store.calls().len(), 1);
    }

    #[test]
    fn empty_manifest_succeeds_without_store_calls() {
        let manifest = write_manifest(&[]);
        let store = seeded_store();
        let env = full_environment();

        let summary = deploy_assets(
            &create_event(),
            &config_for(&manifest),
            &|name| env.get(name).cloned(),
            &store,
        )
        .expect("empty manifest should deploy nothing");

        assert_eq!(summary.files_copied, 0);
        assert!(!summary.runtime_config_replaced);
        assert!(store.calls().is_empty());
    }
}
