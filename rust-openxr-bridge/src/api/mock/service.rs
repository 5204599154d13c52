use rust_openxr_bridge_api::mock::MockXrControlMsg;
use rust_openxr_bridge_api::{check, ActionPoseState, ActionState, ActionType, FrameBuffer, FrameSubmitter,
                             HapticFeedback, InstanceInfo, Polled, ReferenceSpaceType, RenderFn, SystemInfo,
                             TransportMode, View, ViewConfigurationView, XrResult, XrTransport};
use std::sync::mpsc::Receiver;

pub const STUB_RESOLUTIONS: [(u32, u32); 2] = [(512, 512), (1024, 1024)];

struct MockState {
    action_states: Vec<ActionState>,
    pose_states: Vec<ActionPoseState>,
    views: Vec<View>,
    config_views: Vec<ViewConfigurationView>,
    session_running: bool,
    exit_requested: bool,
    failing: Vec<&'static str>,
}

impl MockState {
    fn handle_msg(&mut self, msg: MockXrControlMsg) {
        match msg {
            MockXrControlMsg::SetActionStates(states) => self.action_states = states,
            MockXrControlMsg::SetPoseStates(states) => self.pose_states = states,
            MockXrControlMsg::SetViews(views) => self.views = views,
            MockXrControlMsg::SetViewConfigurationViews(views) => self.config_views = views,
            MockXrControlMsg::SetSessionRunning(running) => self.session_running = running,
            MockXrControlMsg::RequestExit => self.exit_requested = true,
            MockXrControlMsg::FailCall(call) => self.failing.push(call),
        }
    }
}

/// Transport without a runtime behind it. Every call succeeds unless
/// scripted otherwise through the control channel.
pub struct MockTransport {
    state: MockState,
    receiver: Option<Receiver<MockXrControlMsg>>,
    frames_submitted: usize,
}

impl MockTransport {
    pub fn new() -> MockTransport {
        MockTransport {
            state: MockState {
                action_states: Vec::new(),
                pose_states: Vec::new(),
                views: vec![View::default(); STUB_RESOLUTIONS.len()],
                config_views: STUB_RESOLUTIONS.iter()
                    .map(|&(w, h)| ViewConfigurationView::with_recommended_size(w, h))
                    .collect(),
                session_running: true,
                exit_requested: false,
                failing: Vec::new(),
            },
            receiver: None,
            frames_submitted: 0,
        }
    }

    pub fn new_with_receiver(rcv: Receiver<MockXrControlMsg>) -> MockTransport {
        let mut transport = MockTransport::new();
        transport.receiver = Some(rcv);
        transport
    }

    pub fn frames_submitted(&self) -> usize {
        self.frames_submitted
    }

    // Applies every message sent since the previous call
    fn sync(&mut self) {
        if let Some(ref rcv) = self.receiver {
            while let Ok(msg) = rcv.try_recv() {
                self.state.handle_msg(msg);
            }
        }
    }

    fn call(&mut self, name: &'static str) -> bool {
        self.sync();
        !self.state.failing.contains(&name)
    }
}

impl Default for MockTransport {
    fn default() -> MockTransport {
        MockTransport::new()
    }
}

impl FrameSubmitter for MockTransport {
    fn submit(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        self.set_frames(left, right, rgba)
    }
}

impl XrTransport for MockTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Stub
    }

    fn destroy(&mut self) -> XrResult<()> {
        Ok(())
    }

    fn is_session_running(&self) -> bool {
        self.state.session_running
    }

    fn create_instance(&mut self, info: &InstanceInfo) -> XrResult<()> {
        debug!("Stub instance for {} with extensions {:?}", info.application_name, info.extensions);
        check(self.call("create_instance"), "create_instance")
    }

    fn get_system(&mut self, _info: &SystemInfo) -> XrResult<()> {
        check(self.call("get_system"), "get_system")
    }

    fn create_session(&mut self) -> XrResult<()> {
        check(self.call("create_session"), "create_session")
    }

    fn poll_events(&mut self) -> XrResult<bool> {
        check(self.call("poll_events"), "poll_events")?;
        Ok(!self.state.exit_requested)
    }

    fn poll_actions(&mut self, capacity: usize) -> Polled<ActionState> {
        let success = self.call("poll_actions");
        Polled::new(success, self.state.action_states.iter().take(capacity).cloned().collect())
    }

    fn render_views(&mut self,
                    _reference_space: ReferenceSpaceType,
                    capacity: usize,
                    render: &mut RenderFn<'_>) -> Polled<ActionPoseState> {
        let success = self.call("render_views");
        if !self.state.views.is_empty() {
            let views = self.state.views.clone();
            let config_views = self.state.config_views.clone();
            render(&views, &config_views, self);
        }
        Polled::new(success, self.state.pose_states.iter().take(capacity).cloned().collect())
    }

    fn add_action(&mut self, path: &str, action_type: ActionType, _reference_space: ReferenceSpaceType) -> XrResult<()> {
        debug!("Stub action {} ({:?})", path, action_type);
        check(self.call("add_action"), "add_action")
    }

    fn apply_haptic_feedback(&mut self, _path: &str, _haptic: &HapticFeedback) -> XrResult<()> {
        check(self.call("apply_haptic_feedback"), "apply_haptic_feedback")
    }

    fn stop_haptic_feedback(&mut self, _path: &str) -> XrResult<()> {
        check(self.call("stop_haptic_feedback"), "stop_haptic_feedback")
    }

    fn view_configuration_views(&mut self) -> XrResult<Vec<ViewConfigurationView>> {
        check(self.call("view_configuration_views"), "view_configuration_views")?;
        Ok(self.state.config_views.clone())
    }

    fn set_frames(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        check(self.call("set_frames"), "set_frames")?;
        debug!("Stub frame {}x{} (stereo: {}, rgba: {})", left.width, left.height, right.is_some(), rgba);
        self.frames_submitted += 1;
        Ok(())
    }
}
