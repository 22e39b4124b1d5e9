/// The `capture` module handles video acquisition and frame snapshots.
/// `camera` opens a stream behind the permission surface, `frame` turns the
/// current picture into the JPEG payload the recognizer expects.
pub mod camera;
pub mod frame;

pub use camera::{CameraAccess, CameraConstraints, CameraError, ScreenCamera, StillCamera};
pub use frame::{capture_frame, CaptureError, FrameOptions, VideoSurface};
