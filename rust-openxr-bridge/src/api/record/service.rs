use rust_openxr_bridge_api::{check, ActionPoseState, ActionState, ActionType, FrameBuffer, FrameSubmitter,
                             HapticFeedback, InstanceInfo, Polled, ReferenceSpaceType, RenderFn, SystemInfo,
                             TransportMode, ViewConfigurationView, XrResult, XrTransport};

use super::decode;
use super::{Record, RecordRuntime};

/// Transport over a runtime binding exchanging dynamic records.
pub struct RecordTransport {
    runtime: Box<dyn RecordRuntime>,
    destroyed: bool,
}

impl RecordTransport {
    pub fn new(runtime: Box<dyn RecordRuntime>) -> RecordTransport {
        RecordTransport { runtime, destroyed: false }
    }
}

impl Drop for RecordTransport {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            error!("Error destroying the OpenXR application: {}", e);
        }
    }
}

impl XrTransport for RecordTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Record
    }

    fn destroy(&mut self) -> XrResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        check(self.runtime.destroy(), "destroy")
    }

    fn is_session_running(&self) -> bool {
        !self.destroyed && self.runtime.is_session_running()
    }

    fn create_instance(&mut self, info: &InstanceInfo) -> XrResult<()> {
        let success = self.runtime.create_instance(&info.application_name,
                                                   &info.engine_name,
                                                   &info.api_layers,
                                                   &info.extensions);
        check(success, "create_instance")
    }

    fn get_system(&mut self, info: &SystemInfo) -> XrResult<()> {
        let success = self.runtime.get_system(info.form_factor.raw(),
                                              info.blend_mode.raw(),
                                              info.view_configuration_type.raw());
        check(success, "get_system")
    }

    fn create_session(&mut self) -> XrResult<()> {
        check(self.runtime.create_session(), "create_session")
    }

    fn poll_events(&mut self) -> XrResult<bool> {
        let (success, exit) = self.runtime.poll_events();
        check(success, "poll_events")?;
        Ok(!exit)
    }

    fn poll_actions(&mut self, _capacity: usize) -> Polled<ActionState> {
        let (success, records) = self.runtime.poll_actions();
        Polled::new(success, decode::all(&records, "action state", decode::action_state))
    }

    fn render_views(&mut self,
                    reference_space: ReferenceSpaceType,
                    _capacity: usize,
                    render: &mut RenderFn<'_>) -> Polled<ActionPoseState> {
        let mut forward = |views: &[Record], config_views: &[Record], sink: &mut dyn FrameSubmitter| {
            let views = decode::all(views, "view", decode::view);
            let config_views = decode::all(config_views, "view configuration", decode::view_configuration_view);
            render(&views, &config_views, sink);
        };
        let (success, records) = self.runtime.render_views(reference_space.raw(), &mut forward);
        let states = decode::all(&records, "pose state", decode::pose_state).into_iter().flatten().collect();
        Polled::new(success, states)
    }

    fn add_action(&mut self, path: &str, action_type: ActionType, reference_space: ReferenceSpaceType) -> XrResult<()> {
        check(self.runtime.add_action(path, action_type.raw(), reference_space.raw()), "add_action")
    }

    fn apply_haptic_feedback(&mut self, path: &str, haptic: &HapticFeedback) -> XrResult<()> {
        let success = self.runtime.apply_haptic_feedback(path, haptic.amplitude, haptic.duration, haptic.frequency);
        check(success, "apply_haptic_feedback")
    }

    fn stop_haptic_feedback(&mut self, path: &str) -> XrResult<()> {
        check(self.runtime.stop_haptic_feedback(path), "stop_haptic_feedback")
    }

    fn view_configuration_views(&mut self) -> XrResult<Vec<ViewConfigurationView>> {
        self.runtime.view_configuration_views().iter().map(decode::view_configuration_view).collect()
    }

    fn set_frames(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        check(self.runtime.set_frames(left, right, rgba), "set_frames")
    }
}
