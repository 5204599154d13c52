use crate::{FrameBuffer, XrResult};

pub const XFORM_OP_TRANSLATE: &str = "xformOp:translate";
pub const XFORM_OP_TRANSLATION: &str = "xformOp:translation";
pub const XFORM_OP_ROTATE: &str = "xformOp:rotate";
pub const XFORM_OP_ROTATE_XYZ: &str = "xformOp:rotateXYZ";
pub const XFORM_OP_TRANSFORM: &str = "xformOp:transform";

/// Attribute values written by the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Float(f32),
    Double(f64),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Double3([f64; 3]),
    /// Row-major 4x4 matrix, row-vector convention.
    Matrix4d([f64; 16]),
}

/// Transform operations the bridge may append to a prim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XformOpType {
    Translate,
    RotateXYZ,
    Transform,
}

impl XformOpType {
    pub fn attribute_name(self) -> &'static str {
        match self {
            XformOpType::Translate => XFORM_OP_TRANSLATE,
            XformOpType::RotateXYZ => XFORM_OP_ROTATE_XYZ,
            XformOpType::Transform => XFORM_OP_TRANSFORM,
        }
    }
}

/// The scene graph hosting the camera prims.
///
/// Prims are addressed by their path. Implementations are expected to be cheap
/// to query; the bridge calls them once per eye per frame.
pub trait SceneStage {
    fn prim_exists(&self, path: &str) -> bool;

    /// Defines a camera prim at the first free path derived from `path` and
    /// returns the path actually used.
    fn define_camera(&mut self, path: &str) -> XrResult<String>;

    fn property_names(&self, prim: &str) -> Vec<String>;

    fn set_attribute(&mut self, prim: &str, name: &str, value: AttributeValue) -> XrResult<()>;

    /// Appends a double precision transform op and sets its initial value.
    fn add_xform_op(&mut self, prim: &str, op: XformOpType, value: AttributeValue) -> XrResult<()>;
}

/// A render product attached to a camera prim.
pub trait CameraSensor {
    fn set_resolution(&mut self, resolution: (u32, u32));

    /// Latest rendered image. May be empty while the renderer warms up.
    fn rgba(&mut self) -> XrResult<FrameBuffer>;
}
