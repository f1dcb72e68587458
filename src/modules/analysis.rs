//! Typed analysis payload and the executor boundary
//!
//! The engine treats the analysis backend as a black box: it hands over a
//! free-text intent and gets back a response with optional per-detector
//! sections. The schema below makes each optional section explicit and
//! validates the payload at the boundary via deserialization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors crossing the executor boundary
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis backend reported failure{}", .0.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Upstream(Option<String>),

    #[error("malformed analysis payload: {0}")]
    InvalidPayload(String),
}

/// A single top holder entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHolder {
    pub address: String,
    /// Share of total supply held, in percent
    pub percentage: f64,
    /// Absolute holding, token units
    pub amount: f64,
}

/// Holder distribution section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderAnalysis {
    #[serde(default)]
    pub top_holders: Vec<TopHolder>,
}

/// Volume section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAnalysis {
    /// 24h volume change as a multiplier over the prior window
    pub volume_change_24h: f64,
}

/// Rug-pull section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RugAnalysis {
    /// Confidence that the token is a rug, in percent (0-100)
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Token metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAnalysis {
    pub age_hours: f64,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// Honeypot section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotAnalysis {
    pub is_honeypot: bool,
    pub reason: Option<String>,
}

/// Per-detector sections; every one of them may be absent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub holder_analysis: Option<HolderAnalysis>,
    pub volume_analysis: Option<VolumeAnalysis>,
    pub rug_analysis: Option<RugAnalysis>,
    pub token_analysis: Option<TokenAnalysis>,
    pub honeypot_analysis: Option<HoneypotAnalysis>,
}

/// Envelope returned by the analysis backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub success: bool,
    #[serde(default)]
    pub data: AnalysisData,
    pub error: Option<String>,
}

/// Black-box analysis executor consumed by the alert engine
#[async_trait]
pub trait AnalysisExecutor: Send + Sync {
    /// Run an analysis for a free-text intent
    async fn analyze(&self, intent: &str) -> Result<AnalysisResponse, AnalysisError>;
}

/// Executor backed by an HTTP analysis API
pub struct HttpAnalysisExecutor {
    client: reqwest::Client,
    api_url: String,
}

impl HttpAnalysisExecutor {
    pub fn new(api_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
        }
    }
}

#[async_trait]
impl AnalysisExecutor for HttpAnalysisExecutor {
    async fn analyze(&self, intent: &str) -> Result<AnalysisResponse, AnalysisError> {
        debug!(target: "ANALYSIS", "Requesting analysis: {}", intent);

        let response = self
            .client
            .post(&self.api_url)
            .json(&serde_json::json!({ "intent": intent }))
            .send()
            .await?
            .error_for_status()?;

        let parsed: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::InvalidPayload(e.to_string()))?;

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_partial_payload() {
        let raw = r#"{
            "success": true,
            "data": {
                "holderAnalysis": {
                    "topHolders": [
                        {"address": "Addr1", "percentage": 8.0, "amount": 5000.0}
                    ]
                },
                "honeypotAnalysis": {"isHoneypot": false, "reason": null}
            }
        }"#;

        let response: AnalysisResponse = serde_json::from_str(raw).unwrap();
        assert!(response.success);

        let holders = response.data.holder_analysis.unwrap();
        assert_eq!(holders.top_holders.len(), 1);
        assert_eq!(holders.top_holders[0].percentage, 8.0);

        assert!(response.data.volume_analysis.is_none());
        assert!(response.data.rug_analysis.is_none());
        assert!(response.data.token_analysis.is_none());
        assert!(!response.data.honeypot_analysis.unwrap().is_honeypot);
    }

    #[test]
    fn deserializes_failure_envelope_without_data() {
        let raw = r#"{"success": false, "error": "rate limited"}"#;
        let response: AnalysisResponse = serde_json::from_str(raw).unwrap();
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("rate limited"));
        assert!(response.data.holder_analysis.is_none());
    }
}
