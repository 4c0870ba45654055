use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::envelope::StatusEnvelope;

/// State of the frame-tick driver as exposed to the presentation layer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaptureStatus {
    /// Whether frames are being sampled.
    pub capturing: bool,
    /// Frames handled since capture last started.
    pub frames: u64,
    /// Frames per second over the last full second.
    pub fps: u32,
    /// Hand currently being sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hand_id: Option<String>,
    /// Most recent envelope returned for a tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_envelope: Option<StatusEnvelope>,
}
