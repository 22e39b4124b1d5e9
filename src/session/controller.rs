// controller.rs — Owns the session and runs its event loop.
//
// All mutation happens on the controller task. Callers hold a `SessionHandle`:
// commands go in over an mpsc channel and are acknowledged once applied;
// state comes out as `SessionState` snapshots on a watch channel. Network work
// runs on spawned tasks that post their completions back into the loop, so a
// tap that arrives mid-analysis is seen (and ignored) rather than queued.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::effects::{self, NarrationPolicy};
use super::phase::{PixelTap, SessionPhase, SurfaceRect, TapPoint};
use super::state::{Features, RecognitionTicket, SessionState, VisualJob};
use crate::ai::landmarks::LandmarkCatalog;
use crate::ai::{AiProvider, GeneratedImage, RecognitionResult};
use crate::capture::camera::check_secure_origin;
use crate::capture::{capture_frame, CameraAccess, CameraConstraints, CameraError, FrameOptions, VideoSurface};
use crate::speech::SpeechOutput;

/// Everything about a session that is fixed at startup.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub features: Features,
    pub frame: FrameOptions,
    pub constraints: CameraConstraints,
    /// Origin the UI is served from; must be a secure context.
    pub origin: String,
    pub narration: NarrationPolicy,
    pub landmarks: LandmarkCatalog,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            features: Features {
                persistent_tags: false,
                extended_metadata: false,
            },
            frame: FrameOptions::default(),
            constraints: CameraConstraints::default(),
            origin: "http://localhost".into(),
            narration: NarrationPolicy::default(),
            landmarks: LandmarkCatalog::default(),
        }
    }
}

/// The controller task is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session controller has stopped")]
pub struct SessionClosed;

enum Command {
    RequestCamera {
        reply: oneshot::Sender<SessionPhase>,
    },
    Tap {
        tap: PixelTap,
        rect: SurfaceRect,
        reply: oneshot::Sender<SessionPhase>,
    },
    Dismiss {
        reply: oneshot::Sender<bool>,
    },
    SelectTag {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    Restart {
        reply: oneshot::Sender<()>,
    },
    Shutdown,
}

enum Completion {
    Recognition {
        ticket: RecognitionTicket,
        outcome: Option<RecognitionResult>,
    },
    Visual {
        request_id: u64,
        image: Option<GeneratedImage>,
    },
}

/// Cloneable front door to a running controller.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionState>,
}

impl SessionHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionClosed> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(build(tx))
            .await
            .map_err(|_| SessionClosed)?;
        rx.await.map_err(|_| SessionClosed)
    }

    /// Idle → RequestingCamera → Scanning or Error. Returns the phase the
    /// request ended in.
    pub async fn request_camera_access(&self) -> Result<SessionPhase, SessionClosed> {
        self.request(|reply| Command::RequestCamera { reply }).await
    }

    /// Tap at a pixel position on `rect`. Returns `Analyzing` when a request
    /// was issued, otherwise the unchanged phase.
    pub async fn handle_tap(
        &self,
        tap: PixelTap,
        rect: SurfaceRect,
    ) -> Result<SessionPhase, SessionClosed> {
        self.request(|reply| Command::Tap { tap, rect, reply }).await
    }

    /// Close the displayed result. `false` if nothing was displayed.
    pub async fn dismiss_result(&self) -> Result<bool, SessionClosed> {
        self.request(|reply| Command::Dismiss { reply }).await
    }

    pub async fn select_tag(&self, id: impl Into<String>) -> Result<bool, SessionClosed> {
        let id = id.into();
        self.request(|reply| Command::SelectTag { id, reply }).await
    }

    /// Reset to Idle, dropping the stream and all tags.
    pub async fn restart(&self) -> Result<(), SessionClosed> {
        self.request(|reply| Command::Restart { reply }).await
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionState {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.snapshots.clone()
    }

    /// Wait until a published state satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionState) -> bool,
    ) -> Result<SessionState, SessionClosed> {
        let mut rx = self.snapshots.clone();
        let state = rx.wait_for(predicate).await.map_err(|_| SessionClosed)?;
        Ok(state.clone())
    }
}

pub struct SessionController {
    state: SessionState,
    config: SessionConfig,
    provider: Arc<dyn AiProvider>,
    camera: Arc<dyn CameraAccess>,
    speaker: Option<Arc<dyn SpeechOutput>>,
    surface: Option<Arc<dyn VideoSurface>>,
    commands: mpsc::Receiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<SessionState>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        provider: Arc<dyn AiProvider>,
        camera: Arc<dyn CameraAccess>,
        speaker: Option<Arc<dyn SpeechOutput>>,
    ) -> (Self, SessionHandle) {
        let state = SessionState::new(config.features);
        let (commands_tx, commands_rx) = mpsc::channel(32);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(state.clone());

        let controller = Self {
            state,
            config,
            provider,
            camera,
            speaker,
            surface: None,
            commands: commands_rx,
            completions_tx,
            completions_rx,
            snapshots: snapshots_tx,
        };
        let handle = SessionHandle {
            commands: commands_tx,
            snapshots: snapshots_rx,
        };
        (controller, handle)
    }

    /// Build a controller and run it on a new task.
    pub fn spawn(
        config: SessionConfig,
        provider: Arc<dyn AiProvider>,
        camera: Arc<dyn CameraAccess>,
        speaker: Option<Arc<dyn SpeechOutput>>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (controller, handle) = Self::new(config, provider, camera, speaker);
        (handle, tokio::spawn(controller.run()))
    }

    /// Process commands and completions until shut down or every handle is
    /// dropped.
    pub async fn run(mut self) {
        log::info!(
            "Session controller started (provider={}, camera={}, tags={}, extended={})",
            self.provider.name(),
            self.camera.name(),
            self.config.features.persistent_tags,
            self.config.features.extended_metadata
        );
        loop {
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
                Some(done) = self.completions_rx.recv() => self.handle_completion(done),
            }
        }
        log::info!("Session controller stopped");
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.clone());
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::RequestCamera { reply } => {
                let phase = self.request_camera_access().await;
                let _ = reply.send(phase);
            }
            Command::Tap { tap, rect, reply } => {
                let phase = self.handle_tap(tap, rect);
                let _ = reply.send(phase);
            }
            Command::Dismiss { reply } => {
                let dismissed = self.state.dismiss();
                if dismissed {
                    log::info!("Result dismissed, scanning");
                    self.publish();
                }
                let _ = reply.send(dismissed);
            }
            Command::SelectTag { id, reply } => {
                let selected = self.state.select_tag(&id);
                if selected {
                    self.publish();
                } else {
                    log::debug!("Tag {} not selectable", id);
                }
                let _ = reply.send(selected);
            }
            Command::Restart { reply } => {
                log::info!("Session restarted");
                self.surface = None;
                self.state.restart();
                self.publish();
                let _ = reply.send(());
            }
            Command::Shutdown => {}
        }
    }

    async fn request_camera_access(&mut self) -> SessionPhase {
        if !self.state.begin_camera_request() {
            log::debug!("Camera request ignored in {:?}", self.state.phase());
            return self.state.phase();
        }
        self.publish();

        let opened = match check_secure_origin(&self.config.origin) {
            Ok(()) => self.camera.open(&self.config.constraints).await,
            Err(e) => Err(e),
        };

        match opened {
            Ok(surface) => match surface.dimensions() {
                Some((w, h)) => {
                    log::info!("Camera ready ({}x{}), scanning", w, h);
                    self.surface = Some(surface);
                    self.state.camera_ready(w, h);
                }
                None => {
                    let err = CameraError::Hardware("stream reported no dimensions".into());
                    log::error!("Camera error: {}", err);
                    self.state.camera_failed(&err);
                }
            },
            Err(err) => {
                log::error!("Camera error: {}", err);
                self.state.camera_failed(&err);
            }
        }
        self.publish();
        self.state.phase()
    }

    fn handle_tap(&mut self, tap: PixelTap, rect: SurfaceRect) -> SessionPhase {
        if !self.state.accepts_taps() {
            log::debug!("Tap ignored in {:?}", self.state.phase());
            return self.state.phase();
        }
        let Some(point) = TapPoint::from_pixels(tap, rect) else {
            log::debug!("Tap ignored: empty surface rect");
            return self.state.phase();
        };
        self.state.place_tap(point);

        let Some(frame) = capture_frame(self.surface.as_deref(), self.config.frame) else {
            log::warn!("Tap cancelled: no frame available");
            self.state.cancel_tap();
            self.publish();
            return self.state.phase();
        };

        let Some(ticket) = self.state.begin_analysis() else {
            return self.state.phase();
        };
        log::info!(
            "Analyzing target at ({:.1}%, {:.1}%) [#{}]",
            point.x,
            point.y,
            ticket.request_id
        );
        self.publish();

        let provider = Arc::clone(&self.provider);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = match provider.recognize(&frame, ticket.point.x, ticket.point.y).await {
                Ok(result) => result,
                Err(e) => {
                    log::error!("Recognition failure: {}", e);
                    None
                }
            };
            let _ = tx.send(Completion::Recognition { ticket, outcome });
        });

        self.state.phase()
    }

    fn handle_completion(&mut self, done: Completion) {
        match done {
            Completion::Recognition { ticket, outcome } => {
                let shown = self
                    .state
                    .finish_recognition(ticket, outcome)
                    .map(|active| (active.request_id, active.result.clone()));
                self.publish();
                match shown {
                    Some((request_id, result)) => {
                        log::info!(
                            "Target identified: {} ({}, {:.0}%)",
                            result.name,
                            result.category,
                            result.confidence * 100.0
                        );
                        self.start_side_effects(request_id, &result);
                    }
                    None => log::info!("No target identified for #{}", ticket.request_id),
                }
            }
            Completion::Visual { request_id, image } => {
                if image.is_none() {
                    log::debug!("No visual produced for #{}", request_id);
                }
                let next = self.state.finish_visual(request_id, image);
                self.publish();
                if let Some(job) = next {
                    self.spawn_visual(job);
                }
            }
        }
    }

    fn start_side_effects(&mut self, request_id: u64, result: &RecognitionResult) {
        // Muted sessions skip synthesis as well as playback.
        let narration = self.speaker.clone().and_then(|speaker| {
            self.config
                .narration
                .narration_for(result, &self.config.landmarks)
                .map(|text| (speaker, text))
        });
        if let Some((speaker, text)) = narration {
            let provider = Arc::clone(&self.provider);
            tokio::spawn(async move {
                if let Err(e) = effects::narrate(provider, speaker, text).await {
                    log::warn!("TTS_ERROR: {}", e);
                }
            });
        }

        if self.config.landmarks.wants_visual(result) {
            if let Some(job) = self.state.request_visual(request_id, &result.visual_prompt) {
                self.spawn_visual(job);
            }
            self.publish();
        }
    }

    fn spawn_visual(&self, job: VisualJob) {
        log::debug!("Generating visual for #{}", job.request_id);
        let provider = Arc::clone(&self.provider);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let image = match effects::synthesize_visual(provider, job.prompt).await {
                Ok(image) => image,
                Err(e) => {
                    log::error!("VISUAL_GEN_ERROR: {}", e);
                    None
                }
            };
            let _ = tx.send(Completion::Visual {
                request_id: job.request_id,
                image,
            });
        });
    }
}
