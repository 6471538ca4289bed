//! handmode: hand-gesture mode control.
//!
//! Turns 21-point hand landmark frames into a committed application
//! `Mode` (Formed, Chaos, Focus) plus a palm-anchored cursor, and manages
//! the model/camera lifecycle around the per-frame loop.

pub mod backend;
pub mod config;
pub mod error;
pub mod frame_timing;
pub mod gesture;
pub mod lifecycle;
pub mod sexp;

pub use config::SessionConfig;
pub use error::{AcquisitionError, MalformedFrame};
pub use gesture::{
    CursorPosition, GestureCategory, GesturePipeline, LandmarkFrame, LandmarkPoint, Mode,
    ModeHandle, PipelineEvent, PipelineObserver,
};
pub use lifecycle::{
    CameraStream, FrameSource, LifecycleConfig, LifecycleManager, ModelResource, PipelineStatus,
    StatusHandle,
};
