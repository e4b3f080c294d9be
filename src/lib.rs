pub mod actions;
pub mod app;
pub mod cloudfront;
pub mod config;
pub mod domain;
pub mod orchestrator;
pub mod provider;
pub mod redact;
pub mod resolver;
pub mod telemetry;
