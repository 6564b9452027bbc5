use super::ServiceManager;
use crate::types::Envelope;
use crate::AppState;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};

/// What the process prints and how it exits.
#[derive(Debug, Clone, PartialEq)]
pub struct StdioOutcome {
    pub envelope: Envelope,
    pub exit_code: i32,
    /// Dispatch results are pretty-printed; early failures are printed compact.
    pub pretty: bool,
}

impl StdioOutcome {
    fn fatal(envelope: Envelope) -> Self {
        Self {
            envelope,
            exit_code: 1,
            pretty: false,
        }
    }

    pub fn render(&self) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&self.envelope)
        } else {
            serde_json::to_string(&self.envelope)
        };
        rendered.unwrap_or_else(|e| {
            serde_json::json!({"success": false, "error": e.to_string()}).to_string()
        })
    }
}

/// Process one raw stdin payload. `build` constructs the manager only after
/// the input has parsed.
pub async fn process_input<F>(input: &str, build: F) -> StdioOutcome
where
    F: FnOnce() -> anyhow::Result<ServiceManager>,
{
    if input.trim().is_empty() {
        return StdioOutcome::fatal(Envelope::error("No input data provided"));
    }

    let request: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(e) => {
            return StdioOutcome::fatal(Envelope::error(format!("Invalid JSON input: {}", e)));
        }
    };

    let manager = match build() {
        Ok(m) => m,
        Err(e) => {
            warn!("failed to initialise services: {:?}", e);
            return StdioOutcome::fatal(Envelope::failure(&e));
        }
    };

    StdioOutcome {
        envelope: manager.handle_request(&request).await,
        exit_code: 0,
        pretty: true,
    }
}

/// Read all of stdin, dispatch once, print the envelope. Returns the exit code.
pub async fn run() -> i32 {
    let mut input = String::new();
    let outcome = match tokio::io::stdin().read_to_string(&mut input).await {
        Ok(n) => {
            info!("read {} bytes from stdin", n);
            process_input(&input, || {
                Ok(ServiceManager::new(Arc::new(AppState::from_env()?)))
            })
            .await
        }
        Err(e) => {
            let err = anyhow::Error::new(e).context("failed to read standard input");
            StdioOutcome::fatal(Envelope::failure(&err))
        }
    };

    println!("{}", outcome.render());
    outcome.exit_code
}

/// `--check`: query the remote API and print connectivity plus quota.
pub async fn run_check() -> anyhow::Result<i32> {
    let state = AppState::from_env()?;
    let connected = state.stackoverflow.test_connection().await;
    let quota = state.stackoverflow.get_api_quota().await;

    let report = serde_json::json!({
        "connected": connected,
        "site": state.stackoverflow.client().site(),
        "quota": quota,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if connected { 0 } else { 2 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AssistConfig;
    use serde_json::json;

    fn offline_manager() -> anyhow::Result<ServiceManager> {
        Ok(ServiceManager::new(Arc::new(AppState::new(
            reqwest::Client::new(),
            &AssistConfig::default(),
        ))))
    }

    #[tokio::test]
    async fn empty_input_exits_nonzero() {
        let out = process_input("  \n", offline_manager).await;
        assert_eq!(out.exit_code, 1);
        assert_eq!(out.envelope, Envelope::error("No input data provided"));
    }

    #[tokio::test]
    async fn malformed_json_exits_nonzero() {
        let out = process_input("{\"service\": ", offline_manager).await;
        assert_eq!(out.exit_code, 1);
        assert!(!out.envelope.success);
        assert!(out
            .envelope
            .error
            .unwrap()
            .starts_with("Invalid JSON input: "));
    }

    #[tokio::test]
    async fn manager_is_not_built_for_bad_input() {
        let out = process_input("nope", || anyhow::bail!("should not be called")).await;
        assert!(out.envelope.error.unwrap().starts_with("Invalid JSON input"));
    }

    #[tokio::test]
    async fn build_failure_exits_nonzero_with_traceback() {
        let out = process_input(r#"{"service": "test"}"#, || anyhow::bail!("no client")).await;
        assert_eq!(out.exit_code, 1);
        assert_eq!(out.envelope.error.as_deref(), Some("no client"));
        assert!(out.envelope.traceback.is_some());
    }

    #[tokio::test]
    async fn dispatch_is_pretty_and_exits_zero() {
        let out = process_input(r#"{"service": "test", "params": {}}"#, offline_manager).await;
        assert_eq!(out.exit_code, 0);
        let rendered = out.render();
        assert!(rendered.contains('\n'));
        let v: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(
            v,
            json!({"success": true, "message": "Assist service is working"})
        );
    }
}
