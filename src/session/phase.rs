use serde::{Deserialize, Serialize};

/// Lifecycle phase of a session. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    #[default]
    Idle,
    RequestingCamera,
    Scanning,
    Analyzing,
    ViewingResult,
    Error,
}

/// Where the user tapped, in percent of the tapped surface (0–100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapPoint {
    pub x: f64,
    pub y: f64,
}

/// A raw pointer position in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelTap {
    pub client_x: f64,
    pub client_y: f64,
}

/// The on-screen rectangle of the surface that received the tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    /// A rect at the origin matching a frame size.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: width as f64,
            height: height as f64,
        }
    }
}

impl TapPoint {
    /// Convert a pixel tap to percent of `rect`. `None` for an empty rect or
    /// a position that is not a finite number. Taps outside the rect are
    /// clamped onto its edge.
    pub fn from_pixels(tap: PixelTap, rect: SurfaceRect) -> Option<Self> {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let x = (tap.client_x - rect.left) / rect.width * 100.0;
        let y = (tap.client_y - rect.top) / rect.height * 100.0;
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self {
            x: x.clamp(0.0, 100.0),
            y: y.clamp(0.0, 100.0),
        })
    }
}
