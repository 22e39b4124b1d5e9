// effects.rs — Best-effort follow-ups to a successful recognition.
//
// Narration and visual synthesis run as detached tasks. Each returns a
// `Result` so failures are explicit, but the only consumer of that result is
// a log line; nothing here can change what the session is showing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ai::landmarks::LandmarkCatalog;
use crate::ai::{AiError, AiProvider, GeneratedImage, RecognitionResult};
use crate::speech::{PlaybackError, SpeechOutput};

#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    #[error("speech synthesis failed: {0}")]
    Speech(#[source] AiError),
    #[error("speech playback failed: {0}")]
    Playback(#[source] PlaybackError),
    #[error("visual generation failed: {0}")]
    Visual(#[source] AiError),
    #[error("side effect task aborted: {0}")]
    Join(String),
}

/// When a successful recognition is read out loud.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NarrationPolicy {
    #[default]
    Always,
    /// Only results that matched the landmark catalog.
    Landmarks,
    Off,
}

impl NarrationPolicy {
    /// The line to speak for `result`, if any.
    pub fn narration_for(
        self,
        result: &RecognitionResult,
        landmarks: &LandmarkCatalog,
    ) -> Option<String> {
        let speak = match self {
            NarrationPolicy::Always => true,
            NarrationPolicy::Landmarks => landmarks.lookup(&result.name).is_some(),
            NarrationPolicy::Off => false,
        };
        speak.then(|| {
            format!(
                "Target identified: {}. Initializing intelligence brief.",
                result.name
            )
        })
    }
}

/// Synthesize `text` and play it on `speaker`.
pub async fn narrate(
    provider: Arc<dyn AiProvider>,
    speaker: Arc<dyn SpeechOutput>,
    text: String,
) -> Result<(), SideEffectError> {
    let clip = provider
        .synthesize_speech(&text)
        .await
        .map_err(SideEffectError::Speech)?;
    let Some(clip) = clip else {
        return Ok(());
    };
    tokio::task::spawn_blocking(move || speaker.play_blocking(&clip))
        .await
        .map_err(|e| SideEffectError::Join(e.to_string()))?
        .map_err(SideEffectError::Playback)
}

/// Generate a visual for `prompt`.
pub async fn synthesize_visual(
    provider: Arc<dyn AiProvider>,
    prompt: String,
) -> Result<Option<GeneratedImage>, SideEffectError> {
    provider
        .generate_visual(&prompt)
        .await
        .map_err(SideEffectError::Visual)
}
