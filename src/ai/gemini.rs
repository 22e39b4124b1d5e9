use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use super::landmarks::LandmarkCatalog;
use super::{AiError, AiProvider, GeneratedImage, ProviderConfig, RecognitionResult, SpeechClip};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/";

/// Gemini `generateContent` client covering recognition, image and speech.
pub struct GeminiClient {
    config: ProviderConfig,
    landmarks: LandmarkCatalog,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            landmarks: LandmarkCatalog::default(),
            client: Client::new(),
        }
    }

    pub fn with_landmarks(mut self, landmarks: LandmarkCatalog) -> Self {
        self.landmarks = landmarks;
        self
    }

    fn model_url(&self, model: &str) -> Result<Url, AiError> {
        let base = format!("{}/", self.config.endpoint.trim_end_matches('/'));
        Url::parse(&base)
            .and_then(|u| u.join(&format!("v1beta/models/{model}:generateContent")))
            .map_err(|e| AiError::ConnectionError(format!("bad endpoint URL: {e}")))
    }

    fn recognition_prompt(&self, x: f64, y: f64) -> String {
        let mut prompt = format!(
            "Strictly identify the object at ({}%, {}%).",
            x.round() as i64,
            y.round() as i64
        );
        if let Some(overrides) = self.landmarks.prompt_overrides() {
            prompt.push_str("\n\nOVERRIDES:\n");
            prompt.push_str(&overrides);
        }
        prompt
    }

    fn build_recognition_body(&self, frame_data: &str, x: f64, y: f64) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": "image/jpeg", "data": frame_data } },
                    { "text": self.recognition_prompt(x, y) }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": recognition_schema(self.config.extended_metadata)
            }
        })
    }

    fn build_visual_body(&self, prompt: &str) -> Value {
        json!({
            "contents": [{
                "parts": [{ "text": format!("A grayscale noir architectural photo of: {prompt}.") }]
            }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "imageConfig": { "aspectRatio": "1:1" }
            }
        })
    }

    fn build_speech_body(&self, text: &str) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.config.voice }
                    }
                }
            }
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> Result<Value, AiError> {
        if self.config.api_key.is_empty() {
            return Err(AiError::NotConfigured);
        }
        let url = self.model_url(model)?;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AiError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".into());
            return Err(match status.as_u16() {
                401 | 403 => AiError::AuthError(error_body),
                429 => AiError::RateLimited {
                    retry_after_ms: 1000,
                },
                _ => AiError::ConnectionError(format!("HTTP {}: {}", status, error_body)),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("response body is not JSON: {e}")))
    }
}

#[async_trait]
impl AiProvider for GeminiClient {
    async fn recognize(
        &self,
        frame_data: &str,
        x: f64,
        y: f64,
    ) -> Result<Option<RecognitionResult>, AiError> {
        let body = self.build_recognition_body(frame_data, x, y);
        let response = self
            .generate_content(&self.config.recognition_model, &body)
            .await?;
        let Some(mut result) = parse_recognition(&response)? else {
            return Ok(None);
        };
        if self.landmarks.apply(&mut result) {
            log::info!("Landmark matched: {}", result.name);
        }
        Ok(Some(result))
    }

    async fn generate_visual(&self, prompt: &str) -> Result<Option<GeneratedImage>, AiError> {
        let body = self.build_visual_body(prompt);
        let response = self.generate_content(&self.config.image_model, &body).await?;
        Ok(find_inline_image(&response))
    }

    async fn synthesize_speech(&self, text: &str) -> Result<Option<SpeechClip>, AiError> {
        let body = self.build_speech_body(text);
        let response = self.generate_content(&self.config.speech_model, &body).await?;
        match response
            .pointer("/candidates/0/content/parts/0/inlineData/data")
            .and_then(|d| d.as_str())
        {
            Some(data) => SpeechClip::from_base64(data).map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

// ── helpers (also used by tests) ────────────────────────────────────

fn recognition_schema(extended: bool) -> Value {
    let mut properties = json!({
        "name": { "type": "STRING", "description": "Short common name of the object" },
        "category": { "type": "STRING", "description": "General category" },
        "description": { "type": "STRING", "description": "One-sentence informative description" },
        "funFact": { "type": "STRING", "description": "Detailed facts" },
        "visualPrompt": { "type": "STRING", "description": "Prompt for AI image generation" },
        "confidence": { "type": "NUMBER", "description": "Confidence score" }
    });
    let mut required = vec![
        "name",
        "category",
        "description",
        "funFact",
        "visualPrompt",
        "confidence",
    ];
    if extended {
        if let Some(map) = properties.as_object_mut() {
            map.insert(
                "tacticalAnalysis".into(),
                json!({ "type": "STRING", "description": "Tactical assessment of the object" }),
            );
            map.insert(
                "materialComposition".into(),
                json!({ "type": "STRING", "description": "What the object is made of" }),
            );
        }
        required.extend(["tacticalAnalysis", "materialComposition"]);
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required
    })
}

/// Concatenated text of the first candidate, if any.
fn candidate_text(response: &Value) -> Option<String> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Empty answers are `Ok(None)`; text that does not fit the schema is an error.
fn parse_recognition(response: &Value) -> Result<Option<RecognitionResult>, AiError> {
    let Some(text) = candidate_text(response) else {
        return Ok(None);
    };
    let result: RecognitionResult = serde_json::from_str(text.trim())
        .map_err(|e| AiError::InvalidResponse(format!("bad recognition JSON: {e}")))?;
    if result.name.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(result))
}

fn find_inline_image(response: &Value) -> Option<GeneratedImage> {
    response
        .pointer("/candidates/0/content/parts")?
        .as_array()?
        .iter()
        .find_map(|part| {
            let inline = part.get("inlineData")?;
            let data = inline.get("data")?.as_str()?;
            let mime_type = inline
                .get("mimeType")
                .and_then(|m| m.as_str())
                .unwrap_or("image/png");
            Some(GeneratedImage {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            })
        })
}
