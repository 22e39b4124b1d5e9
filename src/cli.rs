// cli.rs — Terminal front end.
//
// Reads one command per line from stdin and prints session snapshots. This is
// the whole presentation layer: it only reads `SessionState` and sends
// commands through a `SessionHandle`.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ai::gemini::GeminiClient;
use crate::ai::AiProvider;
use crate::capture::{CameraAccess, ScreenCamera, StillCamera};
use crate::session::{
    AppVariant, NarrationPolicy, PixelTap, SessionController, SessionHandle, SessionPhase,
    SessionState, SurfaceRect,
};
use crate::settings::Settings;
use crate::speech::{CpalSpeaker, SpeechOutput};

#[derive(Debug, Parser)]
#[command(name = "vision-ar", version, about = "Tap a frame, identify what is there")]
pub struct Args {
    /// Settings file (defaults to $VISION_AR_CONFIG or ./vision-ar.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// App variant to run
    #[arg(long, value_enum)]
    pub variant: Option<AppVariant>,

    /// Use a still image as the video feed instead of the primary screen
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// When to read results out loud
    #[arg(long, value_enum)]
    pub narration: Option<NarrationPolicy>,

    /// Disable speech playback
    #[arg(long)]
    pub mute: bool,

    /// Origin the session pretends to be served from
    #[arg(long)]
    pub origin: Option<String>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    pub save_config: bool,
}

impl Args {
    /// Apply command-line overrides on top of file settings.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(variant) = self.variant {
            settings.variant = variant;
        }
        if let Some(narration) = self.narration {
            settings.narration = narration;
        }
        if let Some(origin) = &self.origin {
            settings.origin = origin.clone();
        }
        if self.mute {
            settings.speech_enabled = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Start,
    /// Pixel position on the video frame.
    Tap { x: f64, y: f64 },
    Dismiss,
    Select(String),
    Tags,
    Status,
    Restart,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<CliCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".into());
    };
    let cmd = match verb.to_lowercase().as_str() {
        "start" => CliCommand::Start,
        "tap" => {
            let mut coord = |axis: &str| -> Result<f64, String> {
                words
                    .next()
                    .ok_or_else(|| format!("tap needs {axis}"))?
                    .parse::<f64>()
                    .map_err(|e| format!("bad {axis}: {e}"))
            };
            let x = coord("x")?;
            let y = coord("y")?;
            CliCommand::Tap { x, y }
        }
        "dismiss" | "close" => CliCommand::Dismiss,
        "select" => CliCommand::Select(
            words
                .next()
                .ok_or_else(|| "select needs a tag id".to_string())?
                .to_string(),
        ),
        "tags" => CliCommand::Tags,
        "status" => CliCommand::Status,
        "restart" => CliCommand::Restart,
        "help" | "?" => CliCommand::Help,
        "quit" | "exit" => CliCommand::Quit,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(cmd)
}

const HELP: &str = "commands: start | tap X Y | dismiss | select ID | tags | status | restart | quit";

/// Render the parts of a snapshot a HUD would show.
pub fn render_status(state: &SessionState) -> String {
    let mut out = String::new();
    let _ = write!(out, "[{:?}]", state.phase());
    if let Some(tap) = state.tap() {
        let _ = write!(out, " target ({:.1}%, {:.1}%)", tap.x, tap.y);
    }
    if state.is_analyzing() {
        out.push_str(" ANALYZING_TARGET");
    }
    if let Some(msg) = state.error_message() {
        let _ = write!(out, "\n  error: {msg}\n  (restart to try again)");
    }
    if let Some(active) = state.active() {
        let r = &active.result;
        let _ = write!(
            out,
            "\n  {} [{}] {:.0}%\n  {}\n  {}",
            r.name,
            r.category,
            r.confidence * 100.0,
            r.description,
            r.fun_fact
        );
        if let Some(t) = &r.tactical_analysis {
            let _ = write!(out, "\n  tactical: {t}");
        }
        if let Some(m) = &r.material_composition {
            let _ = write!(out, "\n  material: {m}");
        }
        if let Some(w) = &r.weather_facts {
            let _ = write!(out, "\n  weather: {}", w.replace('\n', " / "));
        }
        if let Some(url) = &r.reference_image {
            let _ = write!(out, "\n  reference: {url}");
        }
        if let Some(img) = &active.generated_image {
            let url = img.to_data_url();
            let preview: String = url.chars().take(48).collect();
            let _ = write!(out, "\n  visual: {preview}... ({} chars)", url.len());
        } else if state.is_generating_visual() {
            out.push_str("\n  visual: generating...");
        }
    }
    out
}

pub fn render_tags(state: &SessionState) -> String {
    if !state.features().persistent_tags {
        return "tags are disabled in this variant".into();
    }
    if state.tags().is_empty() {
        return "no tags".into();
    }
    let selected = state.selected_tag().map(|t| t.id.as_str());
    state
        .tags()
        .iter()
        .map(|t| {
            format!(
                "{} {} {} @ ({:.1}%, {:.1}%) {}",
                if Some(t.id.as_str()) == selected { "*" } else { " " },
                t.id,
                t.result.name,
                t.x,
                t.y,
                t.created_at.format("%H:%M:%S")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a snapshot whenever the phase, tag count or visual changes.
fn spawn_printer(handle: &SessionHandle) {
    let mut rx = handle.subscribe();
    tokio::spawn(async move {
        let mut last = None;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let key = (
                state.phase(),
                state.tags().len(),
                state.is_generating_visual(),
                state
                    .active()
                    .map(|a| a.generated_image.is_some())
                    .unwrap_or(false),
            );
            if last != Some(key) {
                println!("{}", render_status(&state));
                last = Some(key);
            }
        }
    });
}

/// Build the session from settings and drive it from stdin.
pub async fn repl(settings: Settings, image: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let provider_config = settings.provider_config();
    if provider_config.api_key.is_empty() {
        log::warn!("No API key configured; recognition will find nothing");
    }
    let provider: Arc<dyn AiProvider> = Arc::new(
        GeminiClient::new(provider_config).with_landmarks(settings.landmarks.clone()),
    );
    let camera: Arc<dyn CameraAccess> = match image {
        Some(path) => Arc::new(StillCamera::new(path)),
        None => Arc::new(ScreenCamera),
    };
    let speaker: Option<Arc<dyn SpeechOutput>> = if settings.speech_enabled {
        Some(Arc::new(CpalSpeaker))
    } else {
        None
    };

    let (handle, task) =
        SessionController::spawn(settings.session_config(), provider, camera, speaker);
    spawn_printer(&handle);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{e}\n{HELP}");
                continue;
            }
        };
        match cmd {
            CliCommand::Start => {
                handle.request_camera_access().await?;
            }
            CliCommand::Tap { x, y } => {
                let state = handle.snapshot();
                let Some((w, h)) = state.frame_size() else {
                    println!("no video yet; run `start` first");
                    continue;
                };
                let phase = handle
                    .handle_tap(
                        PixelTap {
                            client_x: x,
                            client_y: y,
                        },
                        SurfaceRect::from_size(w, h),
                    )
                    .await?;
                if phase != SessionPhase::Analyzing {
                    println!("tap ignored ({phase:?})");
                }
            }
            CliCommand::Dismiss => {
                if !handle.dismiss_result().await? {
                    println!("nothing to dismiss");
                }
            }
            CliCommand::Select(id) => {
                if handle.select_tag(id).await? {
                    println!("{}", render_tags(&handle.snapshot()));
                } else {
                    println!("no such tag");
                }
            }
            CliCommand::Tags => println!("{}", render_tags(&handle.snapshot())),
            CliCommand::Status => println!("{}", render_status(&handle.snapshot())),
            CliCommand::Restart => handle.restart().await?,
            CliCommand::Help => println!("{HELP}"),
            CliCommand::Quit => break,
        }
    }

    handle.shutdown().await;
    task.await?;
    Ok(())
}
