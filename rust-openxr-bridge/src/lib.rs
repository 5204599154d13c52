#[cfg(feature = "ffi")]
extern crate libloading;
#[macro_use]
extern crate log;

pub mod action_registry;
pub mod api;
pub mod frame_transform;
pub mod pose;
pub mod view_rig;
mod xr_session;

pub use rust_openxr_bridge_api::*;
pub use action_registry::{ActionBinding, ActionCallback, ActionRegistry};
pub use frame_transform::{FrameSink, FrameTransformer};
pub use pose::{convert, Eye, PosePipeline, RectificationPair, ReferenceFrame};
pub use view_rig::{teleport_prim, CameraDesc, CameraProperties, EyeCamera, ViewRig};
pub use xr_session::{RenderCallback, SessionState, XrSession};
