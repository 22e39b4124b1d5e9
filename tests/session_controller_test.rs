//! Integration tests for the session controller using mock providers.
//! Fully deterministic: no Gemini API, no camera, no audio hardware.
//!
//! Run: cargo test --test session_controller_test

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use tokio::sync::Semaphore;
use vision_ar_lib::ai::{AiError, AiProvider, GeneratedImage, RecognitionResult, SpeechClip};
use vision_ar_lib::capture::camera::StillSurface;
use vision_ar_lib::capture::{
    CameraAccess, CameraConstraints, CameraError, CaptureError, VideoSurface,
};
use vision_ar_lib::session::{
    AppVariant, NarrationPolicy, PixelTap, SessionConfig, SessionController, SessionHandle,
    SessionPhase, SessionState, SurfaceRect, TAG_CAPACITY,
};
use vision_ar_lib::speech::{PlaybackError, SpeechOutput};

// ---------------------------------------------------------------------------
// Mock implementations
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Recognition {
    /// Always the same lamp.
    Lamp,
    /// "Item 0", "Item 1", ... in call order.
    Numbered,
    Nothing,
    Fail,
}

struct MockProvider {
    recognition: Recognition,
    side_effects_fail: bool,
    /// Speech and visuals succeed but produce nothing.
    side_effects_empty: bool,
    /// When set, each recognition waits for one permit.
    recognize_gate: Option<Arc<Semaphore>>,
    /// When set, each visual waits for one permit.
    visual_gate: Option<Arc<Semaphore>>,
    taps: Mutex<Vec<(f64, f64)>>,
    frames: Mutex<Vec<String>>,
    speech_calls: AtomicUsize,
    visual_calls: AtomicUsize,
}

impl MockProvider {
    fn new(recognition: Recognition) -> Self {
        Self {
            recognition,
            side_effects_fail: false,
            side_effects_empty: false,
            recognize_gate: None,
            visual_gate: None,
            taps: Mutex::new(Vec::new()),
            frames: Mutex::new(Vec::new()),
            speech_calls: AtomicUsize::new(0),
            visual_calls: AtomicUsize::new(0),
        }
    }

    fn recognize_calls(&self) -> usize {
        self.taps.lock().unwrap().len()
    }
}

fn result_named(name: &str) -> RecognitionResult {
    RecognitionResult {
        name: name.into(),
        category: "Furniture".into(),
        description: format!("A {name}."),
        fun_fact: "It glows.".into(),
        visual_prompt: format!("{name} prompt"),
        confidence: 0.92,
        tactical_analysis: None,
        material_composition: None,
        reference_image: None,
        weather_facts: None,
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    async fn recognize(
        &self,
        frame_data: &str,
        x: f64,
        y: f64,
    ) -> Result<Option<RecognitionResult>, AiError> {
        let index = {
            let mut taps = self.taps.lock().unwrap();
            taps.push((x, y));
            taps.len() - 1
        };
        self.frames.lock().unwrap().push(frame_data.to_string());
        if let Some(gate) = &self.recognize_gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.recognition {
            Recognition::Lamp => Ok(Some(result_named("Lamp"))),
            Recognition::Numbered => Ok(Some(result_named(&format!("Item {index}")))),
            Recognition::Nothing => Ok(None),
            Recognition::Fail => Err(AiError::ConnectionError("offline".into())),
        }
    }

    async fn generate_visual(&self, prompt: &str) -> Result<Option<GeneratedImage>, AiError> {
        self.visual_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.visual_gate {
            gate.acquire().await.unwrap().forget();
        }
        if self.side_effects_fail {
            return Err(AiError::ModelError("image model down".into()));
        }
        if self.side_effects_empty {
            return Ok(None);
        }
        Ok(Some(GeneratedImage {
            mime_type: "image/png".into(),
            data: prompt.to_string(),
        }))
    }

    async fn synthesize_speech(&self, _text: &str) -> Result<Option<SpeechClip>, AiError> {
        self.speech_calls.fetch_add(1, Ordering::SeqCst);
        if self.side_effects_fail {
            return Err(AiError::RateLimited {
                retry_after_ms: 1000,
            });
        }
        if self.side_effects_empty {
            return Ok(None);
        }
        Ok(Some(SpeechClip {
            pcm: vec![0u8; 480],
            sample_rate: 24_000,
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

enum CameraMode {
    Frame(u32, u32),
    Deny,
    NoDimensions,
    BrokenGrab,
}

struct MockCamera {
    mode: CameraMode,
    opens: AtomicUsize,
}

impl MockCamera {
    fn new(mode: CameraMode) -> Self {
        Self {
            mode,
            opens: AtomicUsize::new(0),
        }
    }
}

/// Reports a size but never yields a frame.
struct BrokenSurface {
    size: Option<(u32, u32)>,
}

impl VideoSurface for BrokenSurface {
    fn dimensions(&self) -> Option<(u32, u32)> {
        self.size
    }

    fn grab(&self) -> Result<RgbaImage, CaptureError> {
        Err(CaptureError::NotReady)
    }
}

#[async_trait]
impl CameraAccess for MockCamera {
    async fn open(
        &self,
        _constraints: &CameraConstraints,
    ) -> Result<Arc<dyn VideoSurface>, CameraError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            CameraMode::Frame(w, h) => Ok(Arc::new(StillSurface::new(RgbaImage::from_pixel(
                w,
                h,
                Rgba([40, 80, 120, 255]),
            )))),
            CameraMode::Deny => Err(CameraError::Denied),
            CameraMode::NoDimensions => Ok(Arc::new(BrokenSurface { size: None })),
            CameraMode::BrokenGrab => Ok(Arc::new(BrokenSurface {
                size: Some((64, 36)),
            })),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Default)]
struct RecordingSpeaker {
    played: Mutex<Vec<usize>>,
}

impl SpeechOutput for RecordingSpeaker {
    fn play_blocking(&self, clip: &SpeechClip) -> Result<(), PlaybackError> {
        self.played.lock().unwrap().push(clip.pcm.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    handle: SessionHandle,
    provider: Arc<MockProvider>,
    camera: Arc<MockCamera>,
    speaker: Arc<RecordingSpeaker>,
}

fn start(variant: AppVariant, provider: MockProvider, camera: CameraMode) -> Harness {
    start_with(
        SessionConfig {
            features: variant.into(),
            ..SessionConfig::default()
        },
        provider,
        camera,
    )
}

fn start_with(config: SessionConfig, provider: MockProvider, camera: CameraMode) -> Harness {
    let provider = Arc::new(provider);
    let camera = Arc::new(MockCamera::new(camera));
    let speaker = Arc::new(RecordingSpeaker::default());
    let (handle, _task) = SessionController::spawn(
        config,
        provider.clone(),
        camera.clone(),
        Some(speaker.clone() as Arc<dyn SpeechOutput>),
    );
    Harness {
        handle,
        provider,
        camera,
        speaker,
    }
}

async fn settle(
    handle: &SessionHandle,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    tokio::time::timeout(Duration::from_secs(5), handle.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("controller stopped")
}

async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never became true");
}

async fn tap_center(handle: &SessionHandle, w: u32, h: u32) -> SessionPhase {
    handle
        .handle_tap(
            PixelTap {
                client_x: w as f64 / 2.0,
                client_y: h as f64 / 2.0,
            },
            SurfaceRect::from_size(w, h),
        )
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Tapping the center of a 1080p feed identifies the lamp at (50%, 50%).
#[tokio::test]
async fn center_tap_shows_result() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(1920, 1080),
    );
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Scanning
    );
    assert_eq!(h.handle.snapshot().frame_size(), Some((1920, 1080)));

    let phase = h
        .handle
        .handle_tap(
            PixelTap {
                client_x: 960.0,
                client_y: 540.0,
            },
            SurfaceRect::from_size(1920, 1080),
        )
        .await
        .unwrap();
    assert_eq!(phase, SessionPhase::Analyzing);

    let state = settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;
    let active = state.active().unwrap();
    assert_eq!(active.result.name, "Lamp");
    let tap = state.tap().unwrap();
    assert!((tap.x - 50.0).abs() < 1e-9);
    assert!((tap.y - 50.0).abs() < 1e-9);
    assert!(state.tags().is_empty(), "ephemeral variant keeps no tags");

    assert_eq!(*h.provider.taps.lock().unwrap(), vec![(50.0, 50.0)]);
    let frame = h.provider.frames.lock().unwrap()[0].clone();
    assert!(!frame.is_empty());
    assert!(!frame.starts_with("data:"), "frame is bare base64");
}

/// A null recognition returns to scanning and clears the reticle.
#[tokio::test]
async fn nothing_found_returns_to_scanning() {
    let h = start(
        AppVariant::Tagged,
        MockProvider::new(Recognition::Nothing),
        CameraMode::Frame(64, 36),
    );
    h.handle.request_camera_access().await.unwrap();
    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Analyzing);

    let state = settle(&h.handle, |s| {
        s.phase() == SessionPhase::Scanning && !s.is_analyzing()
    })
    .await;
    assert!(state.tap().is_none());
    assert!(state.active().is_none());
    assert!(state.tags().is_empty());
    assert_eq!(h.provider.speech_calls.load(Ordering::SeqCst), 0);
}

/// A failing provider is treated like "nothing found".
#[tokio::test]
async fn provider_error_returns_to_scanning() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Fail),
        CameraMode::Frame(64, 36),
    );
    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;

    let state = settle(&h.handle, |s| {
        s.phase() == SessionPhase::Scanning && !s.is_analyzing()
    })
    .await;
    assert!(state.tap().is_none());
    assert!(state.error_message().is_none());
}

#[tokio::test]
async fn denied_camera_shows_error() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::Deny,
    );
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Error
    );
    let state = h.handle.snapshot();
    assert!(state.error_message().unwrap().contains("Denied"));

    // Error is terminal until restart.
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Error
    );
    assert_eq!(h.camera.opens.load(Ordering::SeqCst), 1);

    h.handle.restart().await.unwrap();
    let state = h.handle.snapshot();
    assert_eq!(state.phase(), SessionPhase::Idle);
    assert!(state.error_message().is_none());
}

#[tokio::test]
async fn insecure_origin_never_opens_camera() {
    let h = start_with(
        SessionConfig {
            origin: "http://example.com".into(),
            ..SessionConfig::default()
        },
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(64, 36),
    );
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Error
    );
    assert!(h
        .handle
        .snapshot()
        .error_message()
        .unwrap()
        .contains("Secure Context Required"));
    assert_eq!(h.camera.opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stream_without_dimensions_is_an_error() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::NoDimensions,
    );
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Error
    );
}

/// Taps outside Scanning never reach the provider.
#[tokio::test]
async fn taps_outside_scanning_are_ignored() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(64, 36),
    );
    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Idle);
    assert_eq!(h.provider.recognize_calls(), 0);

    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;
    settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;

    assert_eq!(
        tap_center(&h.handle, 64, 36).await,
        SessionPhase::ViewingResult
    );
    assert_eq!(h.provider.recognize_calls(), 1);
}

/// A frame that cannot be grabbed cancels the tap without a request.
#[tokio::test]
async fn unavailable_frame_keeps_scanning() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::BrokenGrab,
    );
    h.handle.request_camera_access().await.unwrap();
    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Scanning);

    let state = h.handle.snapshot();
    assert!(state.tap().is_none());
    assert!(!state.is_analyzing());
    assert_eq!(h.provider.recognize_calls(), 0);
}

#[tokio::test]
async fn dismiss_returns_to_scanning() {
    let h = start(
        AppVariant::Tagged,
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(64, 36),
    );
    assert!(!h.handle.dismiss_result().await.unwrap());

    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;
    settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;

    assert!(h.handle.dismiss_result().await.unwrap());
    let state = h.handle.snapshot();
    assert_eq!(state.phase(), SessionPhase::Scanning);
    assert!(state.active().is_none());
    assert!(state.tap().is_none());
    assert_eq!(state.tags().len(), 1, "tags survive dismissal");
}

/// Eleven results in a tagged session keep the ten newest.
#[tokio::test]
async fn tag_store_keeps_ten_newest() {
    let h = start(
        AppVariant::Tagged,
        MockProvider::new(Recognition::Numbered),
        CameraMode::Frame(64, 36),
    );
    h.handle.request_camera_access().await.unwrap();

    for _ in 0..=TAG_CAPACITY {
        assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Analyzing);
        settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;
        assert!(h.handle.dismiss_result().await.unwrap());
    }

    let state = h.handle.snapshot();
    assert_eq!(state.tags().len(), TAG_CAPACITY);
    let names: Vec<_> = state.tags().iter().map(|t| t.result.name.clone()).collect();
    assert_eq!(names.first().map(String::as_str), Some("Item 10"));
    assert!(!names.contains(&"Item 0".to_string()));

    let newest = state.tags().iter().next().unwrap().id.clone();
    assert!(h.handle.select_tag(newest.clone()).await.unwrap());
    assert_eq!(h.handle.snapshot().selected_tag().unwrap().id, newest);
    assert!(!h.handle.select_tag("missing").await.unwrap());
}

/// Narration and visual generation failures leave the result untouched.
#[tokio::test]
async fn side_effect_failures_do_not_disturb_result() {
    let mut provider = MockProvider::new(Recognition::Lamp);
    provider.side_effects_fail = true;
    let h = start(AppVariant::Ephemeral, provider, CameraMode::Frame(64, 36));
    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;

    let shown = settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;
    let provider = h.provider.clone();
    let state = settle(&h.handle, move |s| {
        provider.visual_calls.load(Ordering::SeqCst) == 1 && !s.is_generating_visual()
    })
    .await;
    eventually(|| h.provider.speech_calls.load(Ordering::SeqCst) == 1).await;

    assert_eq!(state.phase(), SessionPhase::ViewingResult);
    let active = state.active().unwrap();
    assert_eq!(active.result, shown.active().unwrap().result);
    assert!(active.generated_image.is_none());
    assert!(state.error_message().is_none());
    assert!(h.speaker.played.lock().unwrap().is_empty());
}

#[tokio::test]
async fn successful_result_is_narrated_and_visualized() {
    let h = start(
        AppVariant::Ephemeral,
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(64, 36),
    );
    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;

    let state = settle(&h.handle, |s| {
        s.active()
            .map(|a| a.generated_image.is_some())
            .unwrap_or(false)
    })
    .await;
    let image = state.active().unwrap().generated_image.clone().unwrap();
    assert_eq!(image.data, "Lamp prompt");
    assert!(!state.is_generating_visual());

    eventually(|| h.speaker.played.lock().unwrap().len() == 1).await;
    assert_eq!(h.speaker.played.lock().unwrap()[0], 480);
}

#[tokio::test]
async fn narration_off_skips_speech() {
    let h = start_with(
        SessionConfig {
            narration: NarrationPolicy::Off,
            ..SessionConfig::default()
        },
        MockProvider::new(Recognition::Lamp),
        CameraMode::Frame(64, 36),
    );
    h.handle.request_camera_access().await.unwrap();
    tap_center(&h.handle, 64, 36).await;
    settle(&h.handle, |s| {
        s.active()
            .map(|a| a.generated_image.is_some())
            .unwrap_or(false)
    })
    .await;
    assert_eq!(h.provider.speech_calls.load(Ordering::SeqCst), 0);
}

/// A visual that finishes after its result was dismissed is dropped, and
/// only then does the newer result's visual start.
#[tokio::test]
async fn stale_visual_never_lands_on_newer_result() {
    let gate = Arc::new(Semaphore::new(0));
    let mut provider = MockProvider::new(Recognition::Numbered);
    provider.visual_gate = Some(gate.clone());
    let h = start(AppVariant::Tagged, provider, CameraMode::Frame(64, 36));
    h.handle.request_camera_access().await.unwrap();

    tap_center(&h.handle, 64, 36).await;
    settle(&h.handle, |s| s.is_generating_visual()).await;
    assert!(h.handle.dismiss_result().await.unwrap());

    tap_center(&h.handle, 64, 36).await;
    let state = settle(&h.handle, |s| {
        s.phase() == SessionPhase::ViewingResult && s.is_generating_visual()
    })
    .await;
    assert_eq!(state.active().unwrap().result.name, "Item 1");
    assert_eq!(h.provider.visual_calls.load(Ordering::SeqCst), 1);

    gate.add_permits(1);
    eventually(|| h.provider.visual_calls.load(Ordering::SeqCst) == 2).await;
    assert!(h.handle.snapshot().active().unwrap().generated_image.is_none());

    gate.add_permits(1);
    let state = settle(&h.handle, |s| {
        s.active()
            .map(|a| a.generated_image.is_some())
            .unwrap_or(false)
    })
    .await;
    assert_eq!(
        state.active().unwrap().generated_image.as_ref().unwrap().data,
        "Item 1 prompt"
    );
}

#[tokio::test]
async fn handle_reports_closed_after_shutdown() {
    let provider = Arc::new(MockProvider::new(Recognition::Lamp));
    let camera = Arc::new(MockCamera::new(CameraMode::Frame(64, 36)));
    let (handle, task) =
        SessionController::spawn(SessionConfig::default(), provider, camera, None);
    handle.shutdown().await;
    task.await.unwrap();
    assert!(handle.request_camera_access().await.is_err());
}

/// Empty narration and visual answers still show the result exactly once.
#[tokio::test]
async fn empty_side_effects_enter_viewing_result_once() {
    let mut provider = MockProvider::new(Recognition::Lamp);
    provider.side_effects_empty = true;
    let h = start(AppVariant::Ephemeral, provider, CameraMode::Frame(64, 36));
    h.handle.request_camera_access().await.unwrap();

    let entries = Arc::new(AtomicUsize::new(0));
    let mut rx = h.handle.subscribe();
    let counted = entries.clone();
    tokio::spawn(async move {
        let mut previous = rx.borrow_and_update().phase();
        while rx.changed().await.is_ok() {
            let phase = rx.borrow_and_update().phase();
            if phase == SessionPhase::ViewingResult && previous != SessionPhase::ViewingResult {
                counted.fetch_add(1, Ordering::SeqCst);
            }
            previous = phase;
        }
    });

    tap_center(&h.handle, 64, 36).await;
    let provider = h.provider.clone();
    let state = settle(&h.handle, move |s| {
        provider.visual_calls.load(Ordering::SeqCst) == 1 && !s.is_generating_visual()
    })
    .await;
    eventually(|| h.provider.speech_calls.load(Ordering::SeqCst) == 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(state.phase(), SessionPhase::ViewingResult);
    assert!(state.active().unwrap().generated_image.is_none());
    assert_eq!(entries.load(Ordering::SeqCst), 1);
    assert!(h.speaker.played.lock().unwrap().is_empty());
}

/// A session without a speaker never asks for speech.
#[tokio::test]
async fn muted_session_skips_speech_synthesis() {
    let provider = Arc::new(MockProvider::new(Recognition::Lamp));
    let camera = Arc::new(MockCamera::new(CameraMode::Frame(64, 36)));
    let (handle, _task) =
        SessionController::spawn(SessionConfig::default(), provider.clone(), camera, None);
    handle.request_camera_access().await.unwrap();
    tap_center(&handle, 64, 36).await;

    settle(&handle, |s| {
        s.active()
            .map(|a| a.generated_image.is_some())
            .unwrap_or(false)
    })
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.speech_calls.load(Ordering::SeqCst), 0);
}

/// After a restart, a new tap waits until the recognition started before the
/// restart has come back, and that late answer is not shown.
#[tokio::test]
async fn restart_keeps_one_recognition_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let mut provider = MockProvider::new(Recognition::Numbered);
    provider.recognize_gate = Some(gate.clone());
    let h = start(AppVariant::Tagged, provider, CameraMode::Frame(64, 36));

    h.handle.request_camera_access().await.unwrap();
    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Analyzing);
    eventually(|| h.provider.recognize_calls() == 1).await;

    h.handle.restart().await.unwrap();
    assert_eq!(
        h.handle.request_camera_access().await.unwrap(),
        SessionPhase::Scanning
    );
    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Scanning);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.provider.recognize_calls(), 1);

    gate.add_permits(1);
    let state = settle(&h.handle, |s| s.accepts_taps()).await;
    assert_eq!(state.phase(), SessionPhase::Scanning);
    assert!(state.active().is_none());
    assert!(state.tags().is_empty());

    assert_eq!(tap_center(&h.handle, 64, 36).await, SessionPhase::Analyzing);
    gate.add_permits(1);
    let state = settle(&h.handle, |s| s.phase() == SessionPhase::ViewingResult).await;
    assert_eq!(state.active().unwrap().result.name, "Item 1");
    assert_eq!(h.provider.recognize_calls(), 2);
}
