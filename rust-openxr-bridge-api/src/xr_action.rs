use std::convert::TryFrom;
use crate::{HostPose, Pose, XrError, XrResult};

pub const NO_DURATION: i64 = 0;
pub const INFINITE_DURATION: i64 = 1 << 32;
pub const MIN_HAPTIC_DURATION: i64 = -1;
pub const FREQUENCY_UNSPECIFIED: f32 = 0.0;

/// Kind of an action, with its OpenXR numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum ActionType {
    BooleanInput = 1,
    FloatInput = 2,
    Vector2fInput = 3,
    PoseInput = 4,
    VibrationOutput = 100,
}

impl ActionType {
    /// Infers the action kind from the last segment of an action path.
    pub fn from_path(path: &str) -> XrResult<ActionType> {
        let suffix = path.rsplit('/').next().unwrap_or("");
        match suffix {
            "click" | "touch" => Ok(ActionType::BooleanInput),
            "value" | "force" => Ok(ActionType::FloatInput),
            "x" | "y" => Ok(ActionType::Vector2fInput),
            "pose" => Ok(ActionType::PoseInput),
            "haptic" | "haptic_left" | "haptic_right" | "haptic_left_trigger" | "haptic_right_trigger" => {
                Ok(ActionType::VibrationOutput)
            }
            _ => Err(XrError::invalid(format!("the action type cannot be retrieved from the path {}", path))),
        }
    }

    pub fn raw(self) -> i32 {
        self as i32
    }

    pub fn is_output(self) -> bool {
        self == ActionType::VibrationOutput
    }
}

impl TryFrom<i32> for ActionType {
    type Error = XrError;

    fn try_from(value: i32) -> XrResult<ActionType> {
        match value {
            1 => Ok(ActionType::BooleanInput),
            2 => Ok(ActionType::FloatInput),
            3 => Ok(ActionType::Vector2fInput),
            4 => Ok(ActionType::PoseInput),
            100 => Ok(ActionType::VibrationOutput),
            _ => Err(XrError::invalid(format!("invalid action type ({})", value))),
        }
    }
}

/// Space in which pose actions are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum ReferenceSpaceType {
    /// +Y up, +X to the right, and -Z forward, relative to the viewer.
    View = 1,
    /// +Y up, +X to the right, and -Z forward.
    Local = 2,
    /// +Y up, X and Z aligned with the play-area edges.
    Stage = 3,
}

impl ReferenceSpaceType {
    pub fn raw(self) -> i32 {
        self as i32
    }
}

impl Default for ReferenceSpaceType {
    fn default() -> ReferenceSpaceType {
        ReferenceSpaceType::Local
    }
}

impl TryFrom<i32> for ReferenceSpaceType {
    type Error = XrError;

    fn try_from(value: i32) -> XrResult<ReferenceSpaceType> {
        match value {
            1 => Ok(ReferenceSpaceType::View),
            2 => Ok(ReferenceSpaceType::Local),
            3 => Ok(ReferenceSpaceType::Stage),
            _ => Err(XrError::invalid(format!("invalid reference space type ({})", value))),
        }
    }
}

/// Typed payload of an action state record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionStateValue {
    Boolean(bool),
    Float(f32),
    Vector2f([f32; 2]),
    Pose(Pose),
    /// Output actions carry no readable value.
    Vibration,
}

impl ActionStateValue {
    pub fn action_type(&self) -> ActionType {
        match *self {
            ActionStateValue::Boolean(_) => ActionType::BooleanInput,
            ActionStateValue::Float(_) => ActionType::FloatInput,
            ActionStateValue::Vector2f(_) => ActionType::Vector2fInput,
            ActionStateValue::Pose(_) => ActionType::PoseInput,
            ActionStateValue::Vibration => ActionType::VibrationOutput,
        }
    }
}

/// An action state record as returned by an action poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionState {
    pub path: String,
    pub is_active: bool,
    pub value: ActionStateValue,
}

/// A pose action state record as returned by a render call.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionPoseState {
    pub path: String,
    pub is_active: bool,
    pub pose: Pose,
}

/// Value handed to action callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionValue {
    Boolean(bool),
    Float(f32),
    Vector2f(f32, f32),
    Pose(HostPose),
}

/// Haptic request parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde-serialization", serde(default))]
pub struct HapticFeedback {
    pub amplitude: f32,
    /// Nanoseconds, or `MIN_HAPTIC_DURATION` to let the runtime pick the shortest pulse.
    pub duration: i64,
    /// Hertz, or `FREQUENCY_UNSPECIFIED`.
    pub frequency: f32,
}

impl Default for HapticFeedback {
    fn default() -> HapticFeedback {
        HapticFeedback {
            amplitude: 0.5,
            duration: MIN_HAPTIC_DURATION,
            frequency: FREQUENCY_UNSPECIFIED,
        }
    }
}
