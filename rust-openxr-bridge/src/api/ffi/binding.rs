//! Fixed-layout records exchanged with the native bridge library.

use rust_openxr_bridge_api::{self as api, ActionStateValue, ActionType, Fov, Pose, View, ViewConfigurationView};
use std::convert::TryFrom;
use std::ffi::CStr;
use std::os::raw::{c_char, c_float, c_int, c_void};
use std::ptr;

pub type XrActionType = c_int;
pub type XrStructureType = c_int;

// Action type of an unused slot; ends the scan of a returned array
pub const ACTION_TYPE_NONE: XrActionType = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct XrQuaternionf {
    pub x: c_float,
    pub y: c_float,
    pub z: c_float,
    pub w: c_float,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct XrVector3f {
    pub x: c_float,
    pub y: c_float,
    pub z: c_float,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct XrPosef {
    pub orientation: XrQuaternionf,
    pub position: XrVector3f,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct XrFovf {
    pub angle_left: c_float,
    pub angle_right: c_float,
    pub angle_up: c_float,
    pub angle_down: c_float,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XrView {
    pub type_: XrStructureType,
    pub next: *mut c_void,
    pub pose: XrPosef,
    pub fov: XrFovf,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct XrViewConfigurationView {
    pub type_: XrStructureType,
    pub next: *mut c_void,
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ActionState {
    pub type_: XrActionType,
    pub path: *const c_char,
    pub is_active: bool,
    pub state_bool: bool,
    pub state_float: c_float,
    pub state_vector_x: c_float,
    pub state_vector_y: c_float,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ActionPoseState {
    pub type_: XrActionType,
    pub path: *const c_char,
    pub is_active: bool,
    pub pose: XrPosef,
}

impl ActionState {
    pub fn empty() -> ActionState {
        ActionState {
            type_: ACTION_TYPE_NONE,
            path: ptr::null(),
            is_active: false,
            state_bool: false,
            state_float: 0.0,
            state_vector_x: 0.0,
            state_vector_y: 0.0,
        }
    }
}

impl ActionPoseState {
    pub fn empty() -> ActionPoseState {
        ActionPoseState {
            type_: ACTION_TYPE_NONE,
            path: ptr::null(),
            is_active: false,
            pose: XrPosef::default(),
        }
    }
}

impl XrViewConfigurationView {
    pub fn empty() -> XrViewConfigurationView {
        XrViewConfigurationView::from(&ViewConfigurationView::default())
    }
}

impl From<&XrPosef> for Pose {
    fn from(pose: &XrPosef) -> Pose {
        let o = &pose.orientation;
        let p = &pose.position;
        Pose {
            position: [p.x, p.y, p.z],
            orientation: [o.x, o.y, o.z, o.w],
        }
    }
}

impl From<&Pose> for XrPosef {
    fn from(pose: &Pose) -> XrPosef {
        let [x, y, z] = pose.position;
        let [qx, qy, qz, qw] = pose.orientation;
        XrPosef {
            orientation: XrQuaternionf { x: qx, y: qy, z: qz, w: qw },
            position: XrVector3f { x, y, z },
        }
    }
}

impl From<&XrView> for View {
    fn from(view: &XrView) -> View {
        View {
            pose: Pose::from(&view.pose),
            fov: Fov {
                angle_left: view.fov.angle_left,
                angle_right: view.fov.angle_right,
                angle_up: view.fov.angle_up,
                angle_down: view.fov.angle_down,
            },
        }
    }
}

impl From<&XrViewConfigurationView> for ViewConfigurationView {
    fn from(view: &XrViewConfigurationView) -> ViewConfigurationView {
        ViewConfigurationView {
            recommended_image_rect_width: view.recommended_image_rect_width,
            max_image_rect_width: view.max_image_rect_width,
            recommended_image_rect_height: view.recommended_image_rect_height,
            max_image_rect_height: view.max_image_rect_height,
            recommended_swapchain_sample_count: view.recommended_swapchain_sample_count,
            max_swapchain_sample_count: view.max_swapchain_sample_count,
        }
    }
}

impl From<&ViewConfigurationView> for XrViewConfigurationView {
    fn from(view: &ViewConfigurationView) -> XrViewConfigurationView {
        XrViewConfigurationView {
            type_: 0,
            next: ptr::null_mut(),
            recommended_image_rect_width: view.recommended_image_rect_width,
            max_image_rect_width: view.max_image_rect_width,
            recommended_image_rect_height: view.recommended_image_rect_height,
            max_image_rect_height: view.max_image_rect_height,
            recommended_swapchain_sample_count: view.recommended_swapchain_sample_count,
            max_swapchain_sample_count: view.max_swapchain_sample_count,
        }
    }
}

unsafe fn path_of(path: *const c_char) -> Option<String> {
    if path.is_null() {
        None
    } else {
        Some(CStr::from_ptr(path).to_string_lossy().into_owned())
    }
}

/// Decodes the filled prefix of an action state array. Records of an
/// unknown type or without a path are skipped.
///
/// # Safety
/// Every non-null `path` must point to a valid nul-terminated string.
pub unsafe fn decode_action_states(records: &[ActionState]) -> Vec<api::ActionState> {
    let mut states = Vec::new();
    for record in records {
        if record.type_ == ACTION_TYPE_NONE {
            break;
        }
        let action_type = match ActionType::try_from(record.type_) {
            Ok(action_type) => action_type,
            Err(e) => {
                warn!("Dropping action state: {}", e);
                continue;
            }
        };
        let path = match path_of(record.path) {
            Some(path) => path,
            None => {
                warn!("Dropping action state without a path");
                continue;
            }
        };
        let value = match action_type {
            ActionType::BooleanInput => ActionStateValue::Boolean(record.state_bool),
            ActionType::FloatInput => ActionStateValue::Float(record.state_float),
            ActionType::Vector2fInput => ActionStateValue::Vector2f([record.state_vector_x, record.state_vector_y]),
            ActionType::PoseInput => ActionStateValue::Pose(Pose::default()),
            ActionType::VibrationOutput => ActionStateValue::Vibration,
        };
        states.push(api::ActionState { path, is_active: record.is_active, value });
    }
    states
}

/// Decodes the filled prefix of a pose state array. Only pose records are kept.
///
/// # Safety
/// Every non-null `path` must point to a valid nul-terminated string.
pub unsafe fn decode_pose_states(records: &[ActionPoseState]) -> Vec<api::ActionPoseState> {
    let mut states = Vec::new();
    for record in records {
        if record.type_ == ACTION_TYPE_NONE {
            break;
        }
        if record.type_ != ActionType::PoseInput.raw() {
            continue;
        }
        match path_of(record.path) {
            Some(path) => states.push(api::ActionPoseState {
                path,
                is_active: record.is_active,
                pose: Pose::from(&record.pose),
            }),
            None => warn!("Dropping pose state without a path"),
        }
    }
    states
}
