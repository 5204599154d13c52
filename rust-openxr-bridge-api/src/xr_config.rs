use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;
use crate::{XrError, XrResult};

pub const XR_KHR_OPENGL_ENABLE_EXTENSION_NAME: &str = "XR_KHR_opengl_enable";
pub const XR_KHR_OPENGL_ES_ENABLE_EXTENSION_NAME: &str = "XR_KHR_opengl_es_enable";
pub const XR_KHR_VULKAN_ENABLE_EXTENSION_NAME: &str = "XR_KHR_vulkan_enable";
pub const XR_KHR_D3D11_ENABLE_EXTENSION_NAME: &str = "XR_KHR_D3D11_enable";
pub const XR_KHR_D3D12_ENABLE_EXTENSION_NAME: &str = "XR_KHR_D3D12_enable";

/// Graphics API the runtime renders with. Only OpenGL is wired up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum GraphicsApi {
    OpenGl,
    OpenGlEs,
    Vulkan,
    D3D11,
    D3D12,
}

impl GraphicsApi {
    pub fn extension_name(self) -> &'static str {
        match self {
            GraphicsApi::OpenGl => XR_KHR_OPENGL_ENABLE_EXTENSION_NAME,
            GraphicsApi::OpenGlEs => XR_KHR_OPENGL_ES_ENABLE_EXTENSION_NAME,
            GraphicsApi::Vulkan => XR_KHR_VULKAN_ENABLE_EXTENSION_NAME,
            GraphicsApi::D3D11 => XR_KHR_D3D11_ENABLE_EXTENSION_NAME,
            GraphicsApi::D3D12 => XR_KHR_D3D12_ENABLE_EXTENSION_NAME,
        }
    }

    pub fn ensure_supported(self) -> XrResult<GraphicsApi> {
        match self {
            GraphicsApi::OpenGl => Ok(self),
            other => Err(XrError::Unsupported(format!("{} graphics API", other))),
        }
    }
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            GraphicsApi::OpenGl => "OpenGL",
            GraphicsApi::OpenGlEs => "OpenGLES",
            GraphicsApi::Vulkan => "Vulkan",
            GraphicsApi::D3D11 => "D3D11",
            GraphicsApi::D3D12 => "D3D12",
        };
        f.write_str(name)
    }
}

impl FromStr for GraphicsApi {
    type Err = XrError;

    fn from_str(s: &str) -> XrResult<GraphicsApi> {
        match s {
            "OpenGL" | XR_KHR_OPENGL_ENABLE_EXTENSION_NAME => Ok(GraphicsApi::OpenGl),
            "OpenGLES" | XR_KHR_OPENGL_ES_ENABLE_EXTENSION_NAME => Ok(GraphicsApi::OpenGlEs),
            "Vulkan" | XR_KHR_VULKAN_ENABLE_EXTENSION_NAME => Ok(GraphicsApi::Vulkan),
            "D3D11" | XR_KHR_D3D11_ENABLE_EXTENSION_NAME => Ok(GraphicsApi::D3D11),
            "D3D12" | XR_KHR_D3D12_ENABLE_EXTENSION_NAME => Ok(GraphicsApi::D3D12),
            _ => Err(XrError::invalid(format!(
                "invalid graphics API ({}). Valid graphics APIs are OpenGL, OpenGLES, Vulkan, D3D11, D3D12",
                s
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum FormFactor {
    HeadMountedDisplay = 1,
    HandheldDisplay = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum EnvironmentBlendMode {
    Opaque = 1,
    Additive = 2,
    AlphaBlend = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum ViewConfigurationType {
    PrimaryMono = 1,
    PrimaryStereo = 2,
}

macro_rules! raw_enum {
    ($name:ident, $what:expr, { $($value:expr => $variant:ident),+ }) => {
        impl $name {
            pub fn raw(self) -> i32 {
                self as i32
            }
        }

        impl TryFrom<i32> for $name {
            type Error = XrError;

            fn try_from(value: i32) -> XrResult<$name> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(XrError::invalid(format!("invalid {} ({})", $what, value))),
                }
            }
        }
    };
}

raw_enum!(FormFactor, "form factor", { 1 => HeadMountedDisplay, 2 => HandheldDisplay });
raw_enum!(EnvironmentBlendMode, "blend mode", { 1 => Opaque, 2 => Additive, 3 => AlphaBlend });
raw_enum!(ViewConfigurationType, "view configuration type", { 1 => PrimaryMono, 2 => PrimaryStereo });

/// Parameters of `xrCreateInstance`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde-serialization", serde(default))]
pub struct InstanceInfo {
    pub application_name: String,
    pub engine_name: String,
    pub api_layers: Vec<String>,
    /// The selected graphics extension is appended when missing.
    pub extensions: Vec<String>,
}

impl Default for InstanceInfo {
    fn default() -> InstanceInfo {
        InstanceInfo {
            application_name: "Omniverse (XR)".into(),
            engine_name: String::new(),
            api_layers: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

/// Parameters of `xrGetSystem` and the view configuration queries that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct SystemInfo {
    pub form_factor: FormFactor,
    pub blend_mode: EnvironmentBlendMode,
    pub view_configuration_type: ViewConfigurationType,
}

impl SystemInfo {
    pub fn from_raw(form_factor: i32, blend_mode: i32, view_configuration_type: i32) -> XrResult<SystemInfo> {
        Ok(SystemInfo {
            form_factor: FormFactor::try_from(form_factor)?,
            blend_mode: EnvironmentBlendMode::try_from(blend_mode)?,
            view_configuration_type: ViewConfigurationType::try_from(view_configuration_type)?,
        })
    }
}

impl Default for SystemInfo {
    fn default() -> SystemInfo {
        SystemInfo {
            form_factor: FormFactor::HeadMountedDisplay,
            blend_mode: EnvironmentBlendMode::Opaque,
            view_configuration_type: ViewConfigurationType::PrimaryStereo,
        }
    }
}
