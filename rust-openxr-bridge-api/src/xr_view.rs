use crate::Pose;

/// Field of view of a single view, as four angles in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct Fov {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

/// Pose and field of view of one eye for the frame being rendered.
/// Supplied by the runtime every frame and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct View {
    pub pose: Pose,
    pub fov: Fov,
}

/// Per-view image limits advertised by the runtime for the selected view configuration.
///
/// ```
/// use rust_openxr_bridge_api::ViewConfigurationView;
///
/// let view = ViewConfigurationView::with_recommended_size(1024, 512);
/// assert_eq!(view.recommended_size(), (1024, 512));
/// assert_eq!(view.max_image_rect_width, 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct ViewConfigurationView {
    pub recommended_image_rect_width: u32,
    pub max_image_rect_width: u32,
    pub recommended_image_rect_height: u32,
    pub max_image_rect_height: u32,
    pub recommended_swapchain_sample_count: u32,
    pub max_swapchain_sample_count: u32,
}

impl ViewConfigurationView {
    pub fn with_recommended_size(width: u32, height: u32) -> ViewConfigurationView {
        ViewConfigurationView {
            recommended_image_rect_width: width,
            max_image_rect_width: width,
            recommended_image_rect_height: height,
            max_image_rect_height: height,
            recommended_swapchain_sample_count: 1,
            max_swapchain_sample_count: 1,
        }
    }

    pub fn recommended_size(&self) -> (u32, u32) {
        (self.recommended_image_rect_width, self.recommended_image_rect_height)
    }
}
