//! Remote store contract: CRUD operations, error taxonomy, and the
//! user-facing error message classifier.

use crate::play::converter::WirePlay;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Full play payload as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayDetail {
    pub id: i64,
    pub name: String,
    pub team_id: i64,
    #[serde(default)]
    pub created_at: String,
    pub data: WirePlay,
}

/// Listing row for a team's plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaySummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Rejected locally, before any network traffic.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("response parsing error: {0}")]
    Parse(String),

    /// Local entry absent; not fatal, the caller tries the remote instead.
    #[error("no cached copy of play {0}")]
    CacheMiss(i64),

    /// Raw remote failure that no specific variant covers.
    #[error("remote error {code}: {detail}")]
    Remote { code: u16, detail: String },
}

impl GatewayError {
    /// Message suitable for direct presentation.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Validation(message) => message.clone(),
            GatewayError::Connection(_) => "Connection error".to_string(),
            GatewayError::Parse(_) => "Response parsing error".to_string(),
            GatewayError::CacheMiss(play_id) => {
                format!("No offline copy of play {}", play_id)
            }
            GatewayError::NotFound(detail) | GatewayError::Permission(detail) => {
                classify_error_detail(detail)
                    .map(str::to_string)
                    .unwrap_or_else(|| detail.clone())
            }
            GatewayError::Remote { detail, .. } => {
                if detail.is_empty() {
                    "Unknown error occurred".to_string()
                } else {
                    classify_error_detail(detail)
                        .map(str::to_string)
                        .unwrap_or_else(|| detail.clone())
                }
            }
        }
    }
}

/// Best-effort mapping of remote error text to a fixed user-facing message.
///
/// Substring heuristics only; unknown details fall through to `None` and
/// callers present the raw text.
pub fn classify_error_detail(detail: &str) -> Option<&'static str> {
    let lower = detail.to_lowercase();

    // Play-specific errors
    if lower.contains("play") && (lower.contains("not found") || lower.contains("404")) {
        return Some("Play not found");
    }
    if lower.contains("play") && (lower.contains("already") || lower.contains("exists")) {
        return Some("Play name already exists");
    }
    if lower.contains("name") && (lower.contains("required") || lower.contains("empty")) {
        return Some("Play name is required");
    }
    if lower.contains("name") && lower.contains("too short") {
        return Some("Play name is too short");
    }
    if lower.contains("name") && lower.contains("too long") {
        return Some("Play name is too long");
    }
    if lower.contains("data") && (lower.contains("invalid") || lower.contains("empty")) {
        return Some("Invalid play data");
    }
    if lower.contains("team") && lower.contains("not found") {
        return Some("Team not found");
    }
    if lower.contains("permission") || lower.contains("not allowed") {
        return Some("You don't have permission for this action");
    }

    // Generic errors
    if lower.contains("401") || lower.contains("unauthorized") {
        return Some("Unauthorized access");
    }
    if lower.contains("403") || lower.contains("forbidden") {
        return Some("Access denied");
    }
    if lower.contains("404") || lower.contains("not found") {
        return Some("Resource not found");
    }
    if lower.contains("422") || lower.contains("validation") {
        return Some("Invalid input data");
    }
    if lower.contains("500") || lower.contains("internal server") {
        return Some("Server error, please try again later");
    }
    if lower.contains("connection") || lower.contains("timeout") || lower.contains("network") {
        return Some("Connection error");
    }

    None
}

pub fn validate_team_id(team_id: i64) -> Result<(), GatewayError> {
    if team_id <= 0 {
        return Err(GatewayError::Validation("Invalid team ID".to_string()));
    }
    Ok(())
}

pub fn validate_play_id(play_id: i64) -> Result<(), GatewayError> {
    if play_id <= 0 {
        return Err(GatewayError::Validation("Invalid play ID".to_string()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), GatewayError> {
    if name.is_empty() {
        return Err(GatewayError::Validation("Play name is required".to_string()));
    }
    Ok(())
}

pub fn validate_wire_data(data: &WirePlay) -> Result<(), GatewayError> {
    if data.is_empty() {
        return Err(GatewayError::Validation("Empty play data".to_string()));
    }
    Ok(())
}

/// Asynchronous CRUD against the authoritative play store.
///
/// Implementations must validate inputs locally (the `validate_*` helpers)
/// and short-circuit with [`GatewayError::Validation`] before any network
/// call is issued.
#[async_trait]
pub trait PlayGateway: Send + Sync {
    /// Upload a new play for a team, returning the stored detail.
    async fn create(
        &self,
        team_id: i64,
        name: &str,
        data: &WirePlay,
    ) -> Result<PlayDetail, GatewayError>;

    /// List a team's play summaries.
    async fn list(&self, team_id: i64) -> Result<Vec<PlaySummary>, GatewayError>;

    /// Fetch one play, including its step data.
    async fn fetch(&self, play_id: i64) -> Result<PlayDetail, GatewayError>;

    /// Replace the name and data of an existing play.
    async fn update(
        &self,
        play_id: i64,
        name: &str,
        data: &WirePlay,
    ) -> Result<(), GatewayError>;

    async fn delete(&self, play_id: i64) -> Result<(), GatewayError>;

    /// Server-side copy of an existing play, returning the new detail.
    async fn duplicate(&self, play_id: i64) -> Result<PlayDetail, GatewayError>;
}
