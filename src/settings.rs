use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::gemini::DEFAULT_ENDPOINT;
use crate::ai::landmarks::LandmarkCatalog;
use crate::ai::ProviderConfig;
use crate::capture::{CameraConstraints, FrameOptions};
use crate::session::{AppVariant, Features, NarrationPolicy, SessionConfig};

/// Env var naming the settings file.
pub const CONFIG_ENV: &str = "VISION_AR_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "vision-ar.toml";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("settings serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub endpoint: String,
    /// Empty means: read `GEMINI_API_KEY`, then `API_KEY`.
    pub api_key: String,
    pub recognition_model: String,
    pub image_model: String,
    pub speech_model: String,
    pub voice: String,
    pub variant: AppVariant,
    pub jpeg_quality: u8,
    pub capture_max_width: u32,
    pub origin: String,
    pub narration: NarrationPolicy,
    pub speech_enabled: bool,
    pub landmarks: LandmarkCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            api_key: String::new(),
            recognition_model: "gemini-3-flash-preview".into(),
            image_model: "gemini-2.5-flash-image".into(),
            speech_model: "gemini-2.5-flash-preview-tts".into(),
            voice: "Kore".into(),
            variant: AppVariant::Ephemeral,
            jpeg_quality: 85,
            capture_max_width: 1920,
            origin: "http://localhost".into(),
            narration: NarrationPolicy::Always,
            speech_enabled: true,
            landmarks: LandmarkCatalog::default(),
        }
    }
}

impl Settings {
    /// `$VISION_AR_CONFIG`, else `vision-ar.toml` in the working directory.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// The configured key, falling back to the environment.
    pub fn resolved_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        ["GEMINI_API_KEY", "API_KEY"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .unwrap_or_default()
    }

    pub fn features(&self) -> Features {
        self.variant.into()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.resolved_api_key(),
            recognition_model: self.recognition_model.clone(),
            image_model: self.image_model.clone(),
            speech_model: self.speech_model.clone(),
            voice: self.voice.clone(),
            extended_metadata: self.features().extended_metadata,
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            features: self.features(),
            frame: FrameOptions {
                jpeg_quality: self.jpeg_quality,
                max_width: self.capture_max_width,
            },
            constraints: CameraConstraints::default(),
            origin: self.origin.clone(),
            narration: self.narration,
            landmarks: self.landmarks.clone(),
        }
    }
}
