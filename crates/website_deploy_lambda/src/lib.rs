//! AWS-oriented adapters and handlers for the website deployment custom
//! resource.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! object-store and callback seams, client configuration) on top of the
//! contract types in `website_deploy_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
