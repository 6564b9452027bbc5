pub mod check_package;
pub mod stdio;

use crate::types::{Envelope, ServiceRequest};
use crate::AppState;
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub const LIVENESS_MESSAGE: &str = "Assist service is working";

/// Every name the router understands. Anything else is an unknown service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceName {
    Test,
    CheckPackage,
    StackOverflow,
}

impl ServiceName {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "test" => Some(ServiceName::Test),
            "check_package" => Some(ServiceName::CheckPackage),
            "stackoverflow" => Some(ServiceName::StackOverflow),
            _ => None,
        }
    }
}

/// Render a raw `service` value the way it appears in error messages.
fn display_service(service: Option<&Value>) -> String {
    match service {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "None".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Routes one request to a built-in or registered service and wraps the outcome.
#[derive(Debug, Clone)]
pub struct ServiceManager {
    state: Arc<AppState>,
}

impl ServiceManager {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Always returns an envelope; errors become `{success:false, error, traceback}`.
    pub async fn handle_request(&self, request: &Value) -> Envelope {
        match self.dispatch(request).await {
            Ok(envelope) => envelope,
            Err(e) => Envelope::failure(&e),
        }
    }

    async fn dispatch(&self, request: &Value) -> Result<Envelope> {
        if !request.is_object() {
            anyhow::bail!("request must be a JSON object");
        }
        let request: ServiceRequest =
            serde_json::from_value(request.clone()).context("malformed request envelope")?;
        let params = request
            .params
            .unwrap_or_else(|| Value::Object(Default::default()));

        let name = request
            .service
            .as_ref()
            .and_then(|v| v.as_str())
            .and_then(ServiceName::parse);

        match name {
            Some(ServiceName::Test) => Ok(Envelope::message(true, LIVENESS_MESSAGE)),
            Some(ServiceName::CheckPackage) => {
                Ok(check_package::check_package(params.get("package")))
            }
            Some(ServiceName::StackOverflow) => {
                info!("dispatching to stackoverflow");
                let data = self.state.stackoverflow.handle(&params).await?;
                Ok(Envelope::data(data))
            }
            None => Ok(Envelope::error(format!(
                "Unknown service: {}",
                display_service(request.service.as_ref())
            ))),
        }
    }
}
