use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::gateway::{GatewayFailure, TransportError};
use crate::role::TargetRole;
use crate::roadmap::ProbeResult;
use crate::session::SessionId;

#[derive(Debug, Serialize)]
pub(crate) struct ExtractRequest<'a> {
    pub session_id: &'a SessionId,
}

#[derive(Debug, Serialize)]
pub(crate) struct ManualSessionRequest<'a> {
    pub skills: &'a str,
}

/// Everything a roadmap request needs, captured when the action is dispatched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRoadmapRequest {
    pub skills: Vec<String>,
    pub role: TargetRole,
    pub session_id: SessionId,
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProbeRequest<'a> {
    pub input: &'a str,
    pub role: TargetRole,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionPayload {
    pub session_id: SessionId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SkillsPayload {
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProbePayload {
    pub performance_comparison: ProbeResult,
}

/// Interprets a `{success, error, ...}` envelope.
///
/// A body that is not JSON is a transport failure. A JSON body with
/// `success:false` is a rejection carrying the server's message (or
/// `fallback_message` when it sent none). A JSON body without a success flag,
/// or a successful one missing the payload fields, is malformed.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback_message: &str,
) -> Result<T, GatewayFailure> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) if !status.is_success() => {
            return Err(TransportError::Status {
                status: status.as_u16(),
            }
            .into())
        }
        Err(e) => return Err(TransportError::Body(e).into()),
    };

    match value.get("success").and_then(Value::as_bool) {
        Some(true) if status.is_success() => {
            serde_json::from_value(value).map_err(|e| GatewayFailure::Malformed {
                detail: e.to_string(),
            })
        }
        Some(_) => Err(GatewayFailure::Rejected {
            status: status.as_u16(),
            message: error_message(&value, fallback_message),
        }),
        None if !status.is_success() => Err(GatewayFailure::Rejected {
            status: status.as_u16(),
            message: error_message(&value, fallback_message),
        }),
        None => Err(GatewayFailure::Malformed {
            detail: "response lacks a success flag".to_string(),
        }),
    }
}

fn error_message(value: &Value, fallback: &str) -> String {
    value
        .get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}
