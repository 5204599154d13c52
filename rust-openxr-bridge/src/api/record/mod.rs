pub(super) mod decode;
mod service;

use rust_openxr_bridge_api::{FrameBuffer, FrameSubmitter, XrResult, XrTransport, XrTransportCreator};
use serde_json::{Map, Value};

pub use self::service::RecordTransport;

/// A dynamic key/value record, as exchanged with a record based runtime.
pub type Record = Map<String, Value>;

/// Render handler a record runtime calls with the view and view
/// configuration records of each frame.
pub type RecordRenderFn<'a> = dyn FnMut(&[Record], &[Record], &mut dyn FrameSubmitter) + 'a;

/// A runtime binding speaking in dynamic records.
///
/// Every call reports the runtime success flag. Records use the runtime's
/// field names (`isActive`, `stateFloat`, `recommendedImageRectWidth`, ...).
pub trait RecordRuntime {
    fn destroy(&mut self) -> bool;

    fn is_session_running(&self) -> bool;

    fn create_instance(&mut self,
                       application_name: &str,
                       engine_name: &str,
                       api_layers: &[String],
                       extensions: &[String]) -> bool;

    fn get_system(&mut self, form_factor: i32, blend_mode: i32, view_configuration_type: i32) -> bool;

    fn create_session(&mut self) -> bool;

    /// Returns the success flag and whether the runtime asks to exit.
    fn poll_events(&mut self) -> (bool, bool);

    fn poll_actions(&mut self) -> (bool, Vec<Record>);

    /// Renders one frame, calling `render` with the frame's views, and
    /// returns the pose action records of the frame.
    fn render_views(&mut self, reference_space: i32, render: &mut RecordRenderFn<'_>) -> (bool, Vec<Record>);

    fn add_action(&mut self, path: &str, action_type: i32, reference_space: i32) -> bool;

    fn apply_haptic_feedback(&mut self, path: &str, amplitude: f32, duration: i64, frequency: f32) -> bool;

    fn stop_haptic_feedback(&mut self, path: &str) -> bool;

    fn view_configuration_views(&mut self) -> Vec<Record>;

    fn set_frames(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> bool;
}

type RuntimeFactory = Box<dyn Fn() -> XrResult<Box<dyn RecordRuntime>>>;

/// Creates transports over the record runtime produced by `factory`.
pub struct RecordTransportCreator {
    factory: RuntimeFactory,
}

impl RecordTransportCreator {
    pub fn new<F>(factory: F) -> RecordTransportCreator
        where F: Fn() -> XrResult<Box<dyn RecordRuntime>> + 'static
    {
        RecordTransportCreator { factory: Box::new(factory) }
    }
}

impl XrTransportCreator for RecordTransportCreator {
    fn new_transport(&self) -> XrResult<Box<dyn XrTransport>> {
        let runtime = (self.factory)()?;
        info!("OpenXR initialized using the record interface");
        Ok(Box::new(RecordTransport::new(runtime)))
    }
}
