use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct RelayMetrics {
    registry: Registry,
    login_attempts: IntCounterVec,
    tokens_issued: IntCounter,
}

impl RelayMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let login_attempts = IntCounterVec::new(
            Opts::new(
                "relay_login_attempts_total",
                "Count of provider login callbacks grouped by provider and outcome",
            ),
            &["provider", "outcome"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;

        let tokens_issued = IntCounter::new(
            "relay_tokens_issued_total",
            "Count of signed tokens handed to the cookie boundary",
        )?;
        registry.register(Box::new(tokens_issued.clone()))?;

        Ok(Self {
            registry,
            login_attempts,
            tokens_issued,
        })
    }

    pub fn login_attempt(&self, provider: &str, outcome: &str) {
        self.login_attempts
            .with_label_values(&[provider, outcome])
            .inc();
    }

    pub fn token_issued(&self) {
        self.tokens_issued.inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}
