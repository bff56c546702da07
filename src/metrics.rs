//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Auth Metrics
    pub static ref AUTH_DECISIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("safenotes_auth_decisions_total", "Auth interceptor decisions by outcome"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref SESSION_ACTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("safenotes_session_actions_total", "Session mutations applied on commit"),
        &["action", "status"]
    ).expect("metric can be created");
    pub static ref INTERCEPTOR_SHORT_CIRCUITS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("safenotes_interceptor_short_circuits_total", "Requests answered by an interceptor before the handler"),
        &["interceptor"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("safenotes_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(AUTH_DECISIONS_TOTAL.clone()))
        .expect("AUTH_DECISIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SESSION_ACTIONS_TOTAL.clone()))
        .expect("SESSION_ACTIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(INTERCEPTOR_SHORT_CIRCUITS_TOTAL.clone()))
        .expect("INTERCEPTOR_SHORT_CIRCUITS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
