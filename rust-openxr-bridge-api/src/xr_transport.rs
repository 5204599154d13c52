use crate::{ActionPoseState, ActionState, ActionType, FrameBuffer, HapticFeedback, InstanceInfo,
            ReferenceSpaceType, SystemInfo, View, ViewConfigurationView, XrResult};

/// How the native runtime is reached. Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// C ABI entry points exchanging fixed-layout records.
    Struct,
    /// Dynamic key/value records.
    Record,
    /// No runtime at all; every call succeeds.
    Stub,
}

/// Records returned by a poll, together with the runtime success flag.
/// The records are valid even when `success` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct Polled<T> {
    pub success: bool,
    pub states: Vec<T>,
}

impl<T> Polled<T> {
    pub fn new(success: bool, states: Vec<T>) -> Polled<T> {
        Polled { success, states }
    }
}

/// Entry point for submitting the rendered images of the current frame.
pub trait FrameSubmitter {
    /// `right` is absent for monoscopic views. `rgba` tells whether buffers carry 4 bytes per pixel.
    fn submit(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()>;
}

/// Callback invoked by the runtime, once per frame, from inside `render_views`.
pub type RenderFn<'a> = dyn FnMut(&[View], &[ViewConfigurationView], &mut dyn FrameSubmitter) + 'a;

/// The operations the session needs from the native runtime.
///
/// Every implementation exposes the same semantics; which one is in use is
/// decided once when the session is initialized.
pub trait XrTransport {
    fn mode(&self) -> TransportMode;

    fn destroy(&mut self) -> XrResult<()>;

    fn is_session_running(&self) -> bool;

    fn create_instance(&mut self, info: &InstanceInfo) -> XrResult<()>;

    fn get_system(&mut self, info: &SystemInfo) -> XrResult<()>;

    fn create_session(&mut self) -> XrResult<()>;

    /// Returns `Ok(false)` when the runtime asks the frame loop to end.
    fn poll_events(&mut self) -> XrResult<bool>;

    /// `capacity` is the number of subscribed actions.
    fn poll_actions(&mut self, capacity: usize) -> Polled<ActionState>;

    /// Waits for, renders and ends one frame. `render` is invoked with the
    /// views of the frame; `capacity` is the number of subscribed pose actions.
    fn render_views(&mut self,
                    reference_space: ReferenceSpaceType,
                    capacity: usize,
                    render: &mut RenderFn<'_>) -> Polled<ActionPoseState>;

    fn add_action(&mut self, path: &str, action_type: ActionType, reference_space: ReferenceSpaceType) -> XrResult<()>;

    fn apply_haptic_feedback(&mut self, path: &str, haptic: &HapticFeedback) -> XrResult<()>;

    fn stop_haptic_feedback(&mut self, path: &str) -> XrResult<()>;

    fn view_configuration_views(&mut self) -> XrResult<Vec<ViewConfigurationView>>;

    fn set_frames(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()>;
}

pub trait XrTransportCreator {
    fn new_transport(&self) -> XrResult<Box<dyn XrTransport>>;
}
