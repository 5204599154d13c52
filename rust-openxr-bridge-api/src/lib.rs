#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

pub mod mock;
pub mod utils;

pub mod xr_action;
pub mod xr_config;
pub mod xr_error;
pub mod xr_frame_buffer;
pub mod xr_pose;
pub mod xr_scene;
pub mod xr_transport;
pub mod xr_view;

pub use xr_action::{ActionPoseState, ActionState, ActionStateValue, ActionType, ActionValue, HapticFeedback,
                    ReferenceSpaceType, FREQUENCY_UNSPECIFIED, INFINITE_DURATION, MIN_HAPTIC_DURATION, NO_DURATION};
pub use xr_config::{EnvironmentBlendMode, FormFactor, GraphicsApi, InstanceInfo, SystemInfo, ViewConfigurationType};
pub use xr_error::{check, XrError, XrResult};
pub use xr_frame_buffer::{FlipAxis, FrameBuffer, FrameTransformations, PixelFormat};
pub use xr_pose::{Axis, HostPose, Pose, Quat};
pub use xr_scene::{AttributeValue, CameraSensor, SceneStage, XformOpType};
pub use xr_transport::{FrameSubmitter, Polled, RenderFn, TransportMode, XrTransport, XrTransportCreator};
pub use xr_view::{Fov, View, ViewConfigurationView};
