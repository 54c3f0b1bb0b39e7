//! Shared website deployment domain primitives.
//!
//! This crate owns the CloudFormation custom-resource contract, the asset
//! manifest, and the runtime configuration bundle. It intentionally excludes
//! AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod manifest;
pub mod runtime_config;
pub mod storage_keys;
