use async_trait::async_trait;

pub mod gemini;
pub mod landmarks;
pub mod types;
pub use types::*;

/// Trait for the remote multimodal backend.
/// One provider covers recognition, image synthesis and speech synthesis.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Identify the object at (`x`, `y`) percent of a frame.
    /// `frame_data` is base64-encoded JPEG without a data-URL header.
    /// `Ok(None)` means the model answered but found nothing usable.
    async fn recognize(
        &self,
        frame_data: &str,
        x: f64,
        y: f64,
    ) -> Result<Option<RecognitionResult>, AiError>;

    /// Render a square reference image for `prompt`.
    async fn generate_visual(&self, prompt: &str) -> Result<Option<GeneratedImage>, AiError>;

    /// Synthesize `text` as PCM16 speech.
    async fn synthesize_speech(&self, text: &str) -> Result<Option<SpeechClip>, AiError>;

    /// Provider name for logging/display
    fn name(&self) -> &str;
}
