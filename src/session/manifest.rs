use uuid::Uuid;

use crate::foundation::error::{MontageError, MontageResult};
use crate::session::orchestrator::{AssetFailure, RenderResult};

/// The single terminal response of one invocation.
///
/// Success: `{ "success": true, "outputLocation", "filename", "byteSize", "effectiveDuration",
/// "trackCount", "clipCount", ... }`. Failure: `{ "success": false, "errorKind", "message" }`.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderManifest {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile_id: Option<Uuid>,
    /// Hex-encoded plan fingerprint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_failures: Vec<AssetFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Engine diagnostics for render failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl RenderManifest {
    pub fn success(result: &RenderResult) -> Self {
        Self {
            success: true,
            output_location: Some(result.output_path.display().to_string()),
            filename: result
                .output_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            byte_size: Some(result.byte_size),
            effective_duration: Some(result.effective_duration),
            track_count: Some(result.track_count),
            clip_count: Some(result.clip_count),
            compile_id: Some(result.compile_id),
            plan_fingerprint: Some(format!("{:016x}", result.plan_fingerprint)),
            asset_failures: result.asset_failures.clone(),
            ..Self::default()
        }
    }

    pub fn failure(err: &MontageError) -> Self {
        let (message, diagnostics) = match err {
            MontageError::RenderEngine {
                message,
                diagnostics,
            } => (
                message.clone(),
                (!diagnostics.is_empty()).then(|| diagnostics.clone()),
            ),
            other => (format!("{other:#}"), None),
        };
        Self {
            success: false,
            error_kind: Some(err.kind().to_string()),
            message: Some(message),
            diagnostics,
            ..Self::default()
        }
    }

    pub fn from_outcome(outcome: &MontageResult<RenderResult>) -> Self {
        match outcome {
            Ok(result) => Self::success(result),
            Err(err) => Self::failure(err),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/manifest.rs"]
mod tests;
