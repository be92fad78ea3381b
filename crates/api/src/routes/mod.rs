//! HTTP route handlers

pub mod alerts;
pub mod metrics;
pub mod webhook;
