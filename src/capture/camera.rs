// camera.rs — Video stream acquisition.
//
// `CameraAccess` is the permission surface: it either hands back a ready
// `VideoSurface` or a `CameraError` that the session shows on its error screen.
// Two sources ship with the crate: the primary monitor (via `xcap`) and a
// still image file.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use super::frame::{CaptureError, VideoSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacingMode {
    User,
    Environment,
}

/// What the session asks for when it opens a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing_mode: FacingMode,
    pub audio: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1920,
            ideal_height: 1080,
            facing_mode: FacingMode::Environment,
            audio: false,
        }
    }
}

/// Why a stream could not be acquired. The display strings are what the
/// error screen shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera API unavailable: {0}")]
    Unavailable(String),
    #[error("Access Denied: Grant camera permissions.")]
    Denied,
    #[error("CRITICAL: Secure Context Required (HTTPS) for hardware uplink.")]
    InsecureContext,
    #[error("Hardware authorization failed: {0}")]
    Hardware(String),
}

/// The platform's camera permission surface.
#[async_trait]
pub trait CameraAccess: Send + Sync {
    /// Acquire a stream. On success the surface has already reported its
    /// dimensions.
    async fn open(&self, constraints: &CameraConstraints)
        -> Result<Arc<dyn VideoSurface>, CameraError>;

    fn name(&self) -> &str;
}

/// Browsers only expose cameras to secure contexts: https, `file:`, or a
/// loopback host.
pub fn check_secure_origin(origin: &str) -> Result<(), CameraError> {
    let url = Url::parse(origin).map_err(|_| CameraError::InsecureContext)?;
    match url.scheme() {
        "https" | "wss" | "file" => return Ok(()),
        "http" | "ws" => {}
        _ => return Err(CameraError::InsecureContext),
    }
    let loopback = match url.host() {
        Some(Host::Domain(d)) => d.eq_ignore_ascii_case("localhost") || d.ends_with(".localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    };
    if loopback {
        Ok(())
    } else {
        Err(CameraError::InsecureContext)
    }
}

/// Map a backend error message onto the camera taxonomy.
fn classify_backend_error(message: String) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed") {
        CameraError::Denied
    } else {
        CameraError::Hardware(message)
    }
}

// ── Screen source ───────────────────────────────────────────────────────

/// Uses a monitor as the video feed. Handy on desktops without a camera.
pub struct ScreenCamera;

struct ScreenSurface {
    /// Position in `xcap::Monitor::all()`; monitors are re-enumerated per grab.
    index: usize,
    width: u32,
    height: u32,
}

fn grab_monitor(index: Option<usize>) -> Result<(usize, RgbaImage), String> {
    let monitors = xcap::Monitor::all().map_err(|e| format!("enumerate monitors: {e}"))?;
    let index = match index {
        Some(i) => i,
        None => monitors.iter().position(|m| m.is_primary()).unwrap_or(0),
    };
    let monitor = monitors
        .get(index)
        .ok_or_else(|| "no monitors found".to_string())?;
    let image = monitor
        .capture_image()
        .map_err(|e| format!("capture_image: {e}"))?;
    Ok((index, image))
}

#[async_trait]
impl CameraAccess for ScreenCamera {
    async fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> Result<Arc<dyn VideoSurface>, CameraError> {
        if constraints.audio {
            log::debug!("Screen source ignores audio request");
        }
        // The first grab doubles as the permission probe and the metadata read.
        let (index, image) = tokio::task::spawn_blocking(|| grab_monitor(None))
            .await
            .map_err(|e| CameraError::Hardware(e.to_string()))?
            .map_err(|msg| {
                if msg.contains("no monitors") {
                    CameraError::Unavailable(msg)
                } else {
                    classify_backend_error(msg)
                }
            })?;
        log::info!(
            "Screen source opened: monitor {} ({}x{})",
            index,
            image.width(),
            image.height()
        );
        Ok(Arc::new(ScreenSurface {
            index,
            width: image.width(),
            height: image.height(),
        }))
    }

    fn name(&self) -> &str {
        "screen"
    }
}

impl VideoSurface for ScreenSurface {
    fn dimensions(&self) -> Option<(u32, u32)> {
        Some((self.width, self.height))
    }

    fn grab(&self) -> Result<RgbaImage, CaptureError> {
        grab_monitor(Some(self.index))
            .map(|(_, image)| image)
            .map_err(CaptureError::Grab)
    }
}

// ── Still image source ──────────────────────────────────────────────────

/// Serves one image file as a frozen feed.
pub struct StillCamera {
    path: PathBuf,
}

impl StillCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// A fixed frame. Also what tests hand to the controller.
pub struct StillSurface {
    frame: RgbaImage,
}

impl StillSurface {
    pub fn new(frame: RgbaImage) -> Self {
        Self { frame }
    }
}

impl VideoSurface for StillSurface {
    fn dimensions(&self) -> Option<(u32, u32)> {
        let (w, h) = self.frame.dimensions();
        if w == 0 || h == 0 {
            None
        } else {
            Some((w, h))
        }
    }

    fn grab(&self) -> Result<RgbaImage, CaptureError> {
        Ok(self.frame.clone())
    }
}

#[async_trait]
impl CameraAccess for StillCamera {
    async fn open(
        &self,
        _constraints: &CameraConstraints,
    ) -> Result<Arc<dyn VideoSurface>, CameraError> {
        if !self.path.exists() {
            return Err(CameraError::Unavailable(format!(
                "{} does not exist",
                self.path.display()
            )));
        }
        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| CameraError::Hardware(e.to_string()))?
            .map_err(|e| CameraError::Hardware(format!("decode image: {e}")))?
            .to_rgba8();
        log::info!(
            "Still source opened: {} ({}x{})",
            self.path.display(),
            frame.width(),
            frame.height()
        );
        Ok(Arc::new(StillSurface::new(frame)))
    }

    fn name(&self) -> &str {
        "still"
    }
}
