pub mod controller;
pub mod effects;
pub mod phase;
pub mod state;
pub mod tags;

pub use controller::{SessionClosed, SessionConfig, SessionController, SessionHandle};
pub use effects::{NarrationPolicy, SideEffectError};
pub use phase::{PixelTap, SessionPhase, SurfaceRect, TapPoint};
pub use state::{ActiveResult, AppVariant, Features, SessionState};
pub use tags::{Tag, TagStore, TAG_CAPACITY};
