use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Sample rate of the PCM audio returned by the speech model.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// What the recognition model says about the tapped object.
///
/// The first six fields are always requested. `tactical_analysis` and
/// `material_composition` are only part of the response schema when extended
/// metadata is enabled. `reference_image` and `weather_facts` are attached
/// locally by the landmark catalog, never by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub name: String,
    pub category: String,
    pub description: String,
    pub fun_fact: String,
    pub visual_prompt: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactical_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_composition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_facts: Option<String>,
}

/// An image produced by the image model, kept as base64 so it can be handed to
/// a renderer as a data URL without re-encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: String,
}

impl GeneratedImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Raw speech audio: mono 16-bit little-endian PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechClip {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
}

impl SpeechClip {
    /// Decode a base64 PCM16 payload at the speech model's fixed format
    /// (24 kHz mono).
    pub fn from_base64(data: &str) -> Result<Self, AiError> {
        let pcm = BASE64
            .decode(data.trim())
            .map_err(|e| AiError::InvalidResponse(format!("bad audio payload: {e}")))?;
        Ok(Self {
            pcm,
            sample_rate: SPEECH_SAMPLE_RATE,
        })
    }

    /// Samples as i16. A trailing odd byte is ignored.
    pub fn samples(&self) -> Vec<i16> {
        self.pcm
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    pub fn duration_ms(&self) -> u64 {
        let frames = (self.pcm.len() / 2) as u64;
        frames * 1000 / self.sample_rate.max(1) as u64
    }
}

/// Error type for AI operations
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("API key not configured")]
    NotConfigured,
    #[error("Connection failed: {0}")]
    ConnectionError(String),
    #[error("Authentication failed: {0}")]
    AuthError(String),
    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },
    #[error("Model error: {0}")]
    ModelError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Connection details and model names for a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub recognition_model: String,
    pub image_model: String,
    pub speech_model: String,
    pub voice: String,
    /// Ask for `tacticalAnalysis` and `materialComposition` too.
    pub extended_metadata: bool,
}
