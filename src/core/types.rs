use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Incoming request: `{service, params}`. Unknown fields (e.g. `timestamp`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceRequest {
    #[serde(default)]
    pub service: Option<Value>,
    #[serde(default)]
    pub params: Option<Value>,
}

/// Uniform wrapper around every response printed on stdout.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl Envelope {
    pub fn data(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn message(success: bool, message: impl Into<String>) -> Self {
        Self {
            success,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Failure envelope carrying the error chain as a diagnostic trace.
    pub fn failure(err: &anyhow::Error) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            traceback: Some(format!("{:?}", err)),
            ..Default::default()
        }
    }
}

/// Normalized question as emitted to callers.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Question {
    pub question_id: Option<u64>,
    pub title: String,
    pub score: i64,
    pub answer_count: u64,
    pub tags: Vec<String>,
    pub creation_date: Option<i64>,
    pub last_activity_date: Option<i64>,
    pub is_answered: bool,
    pub accepted_answer_id: Option<u64>,
    pub link: String,
    /// Plain text, markup stripped.
    pub body: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Answer {
    pub answer_id: Option<u64>,
    pub score: i64,
    pub is_accepted: bool,
    pub creation_date: Option<i64>,
    pub body: String,
}

/// Either a concrete count or `"unknown"` when the API could not be asked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuotaValue {
    Count(u64),
    Unknown(String),
}

impl QuotaValue {
    pub fn unknown() -> Self {
        QuotaValue::Unknown("unknown".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiQuota {
    pub quota_remaining: QuotaValue,
    pub quota_max: QuotaValue,
    pub has_more: bool,
}

impl ApiQuota {
    pub fn unknown() -> Self {
        Self {
            quota_remaining: QuotaValue::unknown(),
            quota_max: QuotaValue::unknown(),
            has_more: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_omits_absent_fields() {
        let v = serde_json::to_value(Envelope::message(true, "ok")).unwrap();
        assert_eq!(v, json!({"success": true, "message": "ok"}));

        let v = serde_json::to_value(Envelope::error("Unknown service: x")).unwrap();
        assert_eq!(v, json!({"success": false, "error": "Unknown service: x"}));
    }

    #[test]
    fn failure_envelope_carries_context_chain() {
        let err = anyhow::anyhow!("root cause").context("outer");
        let env = Envelope::failure(&err);
        assert_eq!(env.error.as_deref(), Some("outer"));
        assert!(env.traceback.unwrap().contains("root cause"));
    }

    #[test]
    fn unknown_quota_serializes_as_strings() {
        let v = serde_json::to_value(ApiQuota::unknown()).unwrap();
        assert_eq!(
            v,
            json!({"quota_remaining": "unknown", "quota_max": "unknown", "has_more": false})
        );
    }
}
