use rust_openxr_bridge_api::{ActionPoseState, ActionState, ActionStateValue, ActionType, Fov, Pose, View,
                             ViewConfigurationView, XrError, XrResult};
use serde_json::Value;
use std::convert::TryFrom;

use super::Record;

fn field<'a>(record: &'a Record, key: &str) -> XrResult<&'a Value> {
    record.get(key).ok_or_else(|| XrError::invalid(format!("record has no {:?} field", key)))
}

fn object<'a>(record: &'a Record, key: &str) -> XrResult<&'a Record> {
    field(record, key)?.as_object().ok_or_else(|| XrError::invalid(format!("{:?} is not a record", key)))
}

fn float(record: &Record, key: &str) -> XrResult<f32> {
    field(record, key)?.as_f64()
        .map(|f| f as f32)
        .ok_or_else(|| XrError::invalid(format!("{:?} is not a number", key)))
}

fn boolean(record: &Record, key: &str) -> XrResult<bool> {
    field(record, key)?.as_bool().ok_or_else(|| XrError::invalid(format!("{:?} is not a boolean", key)))
}

fn integer(record: &Record, key: &str) -> XrResult<i64> {
    field(record, key)?.as_i64().ok_or_else(|| XrError::invalid(format!("{:?} is not an integer", key)))
}

fn unsigned(record: &Record, key: &str) -> XrResult<u32> {
    field(record, key)?.as_u64()
        .and_then(|u| u32::try_from(u).ok())
        .ok_or_else(|| XrError::invalid(format!("{:?} is not an unsigned 32 bit integer", key)))
}

fn string(record: &Record, key: &str) -> XrResult<String> {
    field(record, key)?.as_str()
        .map(str::to_owned)
        .ok_or_else(|| XrError::invalid(format!("{:?} is not a string", key)))
}

fn action_type(record: &Record) -> XrResult<ActionType> {
    let raw = integer(record, "type")?;
    i32::try_from(raw)
        .map_err(|_| XrError::invalid(format!("invalid action type {}", raw)))
        .and_then(ActionType::try_from)
}

pub fn pose(record: &Record) -> XrResult<Pose> {
    let position = object(record, "position")?;
    let orientation = object(record, "orientation")?;
    Ok(Pose {
        position: [float(position, "x")?, float(position, "y")?, float(position, "z")?],
        orientation: [float(orientation, "x")?, float(orientation, "y")?,
                      float(orientation, "z")?, float(orientation, "w")?],
    })
}

pub fn action_state(record: &Record) -> XrResult<ActionState> {
    let action_type = action_type(record)?;
    let value = match action_type {
        ActionType::BooleanInput => ActionStateValue::Boolean(boolean(record, "stateBool")?),
        ActionType::FloatInput => ActionStateValue::Float(float(record, "stateFloat")?),
        ActionType::Vector2fInput => ActionStateValue::Vector2f([float(record, "stateVectorX")?,
                                                                 float(record, "stateVectorY")?]),
        ActionType::PoseInput => match record.get("pose").and_then(Value::as_object) {
            Some(p) => ActionStateValue::Pose(pose(p)?),
            None => ActionStateValue::Pose(Pose::default()),
        },
        ActionType::VibrationOutput => ActionStateValue::Vibration,
    };
    Ok(ActionState {
        path: string(record, "path")?,
        is_active: boolean(record, "isActive")?,
        value,
    })
}

/// Decodes a record of the render call. Records of other action types yield `None`.
pub fn pose_state(record: &Record) -> XrResult<Option<ActionPoseState>> {
    if action_type(record)? != ActionType::PoseInput {
        return Ok(None);
    }
    Ok(Some(ActionPoseState {
        path: string(record, "path")?,
        is_active: boolean(record, "isActive")?,
        pose: pose(object(record, "pose")?)?,
    }))
}

pub fn view(record: &Record) -> XrResult<View> {
    let fov = object(record, "fov")?;
    Ok(View {
        pose: pose(object(record, "pose")?)?,
        fov: Fov {
            angle_left: float(fov, "angleLeft")?,
            angle_right: float(fov, "angleRight")?,
            angle_up: float(fov, "angleUp")?,
            angle_down: float(fov, "angleDown")?,
        },
    })
}

pub fn view_configuration_view(record: &Record) -> XrResult<ViewConfigurationView> {
    Ok(ViewConfigurationView {
        recommended_image_rect_width: unsigned(record, "recommendedImageRectWidth")?,
        max_image_rect_width: unsigned(record, "maxImageRectWidth")?,
        recommended_image_rect_height: unsigned(record, "recommendedImageRectHeight")?,
        max_image_rect_height: unsigned(record, "maxImageRectHeight")?,
        recommended_swapchain_sample_count: unsigned(record, "recommendedSwapchainSampleCount")?,
        max_swapchain_sample_count: unsigned(record, "maxSwapchainSampleCount")?,
    })
}

/// Decodes every record, dropping (and logging) the malformed ones.
pub fn all<T, F>(records: &[Record], what: &str, decode: F) -> Vec<T>
    where F: Fn(&Record) -> XrResult<T>
{
    records.iter()
        .filter_map(|record| match decode(record) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Dropping {} record: {}", what, e);
                None
            }
        })
        .collect()
}
