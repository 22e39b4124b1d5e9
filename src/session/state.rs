// state.rs — The session state machine.
//
// Pure and synchronous: every method is one transition and reports whether it
// applied. The controller owns the only mutable instance; everyone else sees
// clones through the snapshot channel, so rendering code can read fields but
// never set them.

use serde::{Deserialize, Serialize};

use super::phase::{SessionPhase, TapPoint};
use super::tags::{Tag, TagStore};
use crate::ai::{GeneratedImage, RecognitionResult};
use crate::capture::CameraError;

/// Which of the three app variants the core is running as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AppVariant {
    /// One transient result at a time.
    #[default]
    Ephemeral,
    /// Results persist as on-screen tags.
    Tagged,
    /// Tags carry tactical and material metadata.
    Dossier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub persistent_tags: bool,
    pub extended_metadata: bool,
}

impl From<AppVariant> for Features {
    fn from(variant: AppVariant) -> Self {
        match variant {
            AppVariant::Ephemeral => Self {
                persistent_tags: false,
                extended_metadata: false,
            },
            AppVariant::Tagged => Self {
                persistent_tags: true,
                extended_metadata: false,
            },
            AppVariant::Dossier => Self {
                persistent_tags: true,
                extended_metadata: true,
            },
        }
    }
}

/// Issued when a tap moves the session into `Analyzing`; the completion must
/// hand it back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecognitionTicket {
    pub request_id: u64,
    pub point: TapPoint,
}

/// The result currently on display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveResult {
    pub request_id: u64,
    pub result: RecognitionResult,
    pub point: TapPoint,
    /// Set when the result was also pinned as a tag.
    pub tag_id: Option<String>,
    pub generated_image: Option<GeneratedImage>,
}

/// An image-generation request ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualJob {
    pub request_id: u64,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    features: Features,
    phase: SessionPhase,
    tap: Option<TapPoint>,
    frame_size: Option<(u32, u32)>,
    active: Option<ActiveResult>,
    tags: TagStore,
    selected_tag: Option<String>,
    error_message: Option<String>,
    generating_visual: bool,
    #[serde(skip)]
    analyzing: Option<u64>,
    /// Recognition request still awaiting its completion. Unlike `analyzing`
    /// this survives `restart`.
    #[serde(skip)]
    recognition_in_flight: Option<u64>,
    #[serde(skip)]
    visual_in_flight: Option<u64>,
    #[serde(skip)]
    pending_visual: Option<VisualJob>,
    #[serde(skip)]
    next_request_id: u64,
}

impl SessionState {
    pub fn new(features: Features) -> Self {
        Self {
            features,
            phase: SessionPhase::Idle,
            tap: None,
            frame_size: None,
            active: None,
            tags: TagStore::new(),
            selected_tag: None,
            error_message: None,
            generating_visual: false,
            analyzing: None,
            recognition_in_flight: None,
            visual_in_flight: None,
            pending_visual: None,
            next_request_id: 1,
        }
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn tap(&self) -> Option<TapPoint> {
        self.tap
    }

    pub fn frame_size(&self) -> Option<(u32, u32)> {
        self.frame_size
    }

    pub fn active(&self) -> Option<&ActiveResult> {
        self.active.as_ref()
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn selected_tag(&self) -> Option<&Tag> {
        self.selected_tag.as_deref().and_then(|id| self.tags.get(id))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.is_some()
    }

    /// Whether a visual for the displayed result is being generated or queued.
    pub fn is_generating_visual(&self) -> bool {
        self.generating_visual
    }

    // ── Camera ──────────────────────────────────────────────────────────

    pub fn begin_camera_request(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::RequestingCamera;
        true
    }

    pub fn camera_ready(&mut self, width: u32, height: u32) -> bool {
        if self.phase != SessionPhase::RequestingCamera {
            return false;
        }
        self.frame_size = Some((width, height));
        self.phase = SessionPhase::Scanning;
        true
    }

    pub fn camera_failed(&mut self, error: &CameraError) -> bool {
        if self.phase != SessionPhase::RequestingCamera {
            return false;
        }
        self.error_message = Some(error.to_string());
        self.phase = SessionPhase::Error;
        true
    }

    // ── Taps and recognition ────────────────────────────────────────────

    pub fn accepts_taps(&self) -> bool {
        self.phase == SessionPhase::Scanning
            && self.analyzing.is_none()
            && self.recognition_in_flight.is_none()
    }

    /// Record where the user tapped. No-op unless taps are accepted.
    pub fn place_tap(&mut self, point: TapPoint) -> bool {
        if !self.accepts_taps() {
            return false;
        }
        self.tap = Some(point);
        true
    }

    /// Drop a placed tap whose frame could not be captured.
    pub fn cancel_tap(&mut self) {
        if self.phase == SessionPhase::Scanning {
            self.tap = None;
        }
    }

    /// Move to `Analyzing` for the placed tap.
    pub fn begin_analysis(&mut self) -> Option<RecognitionTicket> {
        if !self.accepts_taps() {
            return None;
        }
        let point = self.tap?;
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.analyzing = Some(request_id);
        self.recognition_in_flight = Some(request_id);
        self.phase = SessionPhase::Analyzing;
        Some(RecognitionTicket { request_id, point })
    }

    /// Apply a recognition outcome. A result moves to `ViewingResult` (and is
    /// pinned as a tag when tags persist); `None` falls back to `Scanning`
    /// with the tap cleared. Completions for anything but the in-flight
    /// request are ignored.
    pub fn finish_recognition(
        &mut self,
        ticket: RecognitionTicket,
        outcome: Option<RecognitionResult>,
    ) -> Option<&ActiveResult> {
        if self.recognition_in_flight == Some(ticket.request_id) {
            self.recognition_in_flight = None;
        }
        if self.phase != SessionPhase::Analyzing || self.analyzing != Some(ticket.request_id) {
            log::debug!("Ignoring stale recognition #{}", ticket.request_id);
            return None;
        }
        self.analyzing = None;

        match outcome {
            Some(result) => {
                let tag_id = if self.features.persistent_tags {
                    let tag = self.tags.add(result.clone(), ticket.point);
                    self.selected_tag = Some(tag.id.clone());
                    Some(tag.id)
                } else {
                    None
                };
                self.active = Some(ActiveResult {
                    request_id: ticket.request_id,
                    result,
                    point: ticket.point,
                    tag_id,
                    generated_image: None,
                });
                self.phase = SessionPhase::ViewingResult;
                self.refresh_visual_flag();
                self.active.as_ref()
            }
            None => {
                self.tap = None;
                self.phase = SessionPhase::Scanning;
                None
            }
        }
    }

    // ── Image generation ────────────────────────────────────────────────

    /// Ask for a visual for the displayed result. Returns the job to run now,
    /// or `None` if the result is gone or another generation is in flight (in
    /// which case the job waits and replaces any earlier waiting job).
    pub fn request_visual(&mut self, request_id: u64, prompt: &str) -> Option<VisualJob> {
        if self.active.as_ref().map(|a| a.request_id) != Some(request_id) {
            return None;
        }
        let job = VisualJob {
            request_id,
            prompt: prompt.to_string(),
        };
        let started = if self.visual_in_flight.is_some() {
            self.pending_visual = Some(job);
            None
        } else {
            self.visual_in_flight = Some(request_id);
            Some(job)
        };
        self.refresh_visual_flag();
        started
    }

    /// Apply a finished generation. The image is attached only if its result
    /// is still displayed. Returns the waiting job, if it should start now.
    pub fn finish_visual(
        &mut self,
        request_id: u64,
        image: Option<GeneratedImage>,
    ) -> Option<VisualJob> {
        if self.visual_in_flight != Some(request_id) {
            return None;
        }
        self.visual_in_flight = None;

        if let Some(active) = self.active.as_mut() {
            if active.request_id == request_id {
                active.generated_image = image;
            }
        }

        let active_id = self.active.as_ref().map(|a| a.request_id);
        let next = self
            .pending_visual
            .take()
            .filter(|job| Some(job.request_id) == active_id);
        if let Some(job) = &next {
            self.visual_in_flight = Some(job.request_id);
        }
        self.refresh_visual_flag();
        next
    }

    fn refresh_visual_flag(&mut self) {
        let active_id = self.active.as_ref().map(|a| a.request_id);
        self.generating_visual = active_id.is_some()
            && (self.visual_in_flight == active_id
                || self.pending_visual.as_ref().map(|j| j.request_id) == active_id);
    }

    // ── Dismissal, tags, restart ────────────────────────────────────────

    /// Close the displayed result and resume scanning. Only valid while
    /// viewing a result.
    pub fn dismiss(&mut self) -> bool {
        if self.phase != SessionPhase::ViewingResult {
            return false;
        }
        self.active = None;
        self.tap = None;
        self.selected_tag = None;
        self.pending_visual = None;
        self.phase = SessionPhase::Scanning;
        self.refresh_visual_flag();
        true
    }

    /// Mark a tag active for its detail card.
    pub fn select_tag(&mut self, id: &str) -> bool {
        if !self.features.persistent_tags || !self.tags.contains(id) {
            return false;
        }
        self.selected_tag = Some(id.to_string());
        true
    }

    /// Back to a fresh `Idle` session, as after a reload. Request ids keep
    /// counting and requests still in flight stay accounted for, so late
    /// completions can never land on a new result and a new tap waits until
    /// the old recognition has come back.
    pub fn restart(&mut self) {
        let next_request_id = self.next_request_id;
        let recognition_in_flight = self.recognition_in_flight;
        let visual_in_flight = self.visual_in_flight;
        *self = Self::new(self.features);
        self.next_request_id = next_request_id;
        self.recognition_in_flight = recognition_in_flight;
        self.visual_in_flight = visual_in_flight;
    }
}
