use rust_openxr_bridge_api::{check, ActionType, AttributeValue, FrameBuffer, FrameSubmitter, FrameTransformations,
                             GraphicsApi, HapticFeedback, InstanceInfo, ReferenceSpaceType, SceneStage, SystemInfo,
                             TransportMode, View, ViewConfigurationView, XrError, XrResult, XrTransport,
                             XrTransportCreator};
use crate::action_registry::{ActionCallback, ActionRegistry};
use crate::frame_transform::{FrameSink, FrameTransformer};
use crate::pose::{PosePipeline, RectificationPair, ReferenceFrame};
use crate::view_rig::{default_camera_properties, CameraDesc, ViewRig};

/// Lifecycle of a session. Setup calls must succeed in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    InstanceCreated,
    SystemObtained,
    SessionCreated,
    Running,
    Destroyed,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::InstanceCreated => "instance created",
            SessionState::SystemObtained => "system obtained",
            SessionState::SessionCreated => "session created",
            SessionState::Running => "running",
            SessionState::Destroyed => "destroyed",
        }
    }
}

/// Render handler set by the caller. It receives the views of the frame and
/// must submit the images through the sink.
pub type RenderCallback = Box<dyn FnMut(&[View], &[ViewConfigurationView], &mut FrameSink)>;

enum RenderHandler {
    // Teleports the view rig cameras and submits their images
    Internal,
    Custom(RenderCallback),
}

struct TransportSubmitter<'a>(&'a mut dyn XrTransport);

impl<'a> FrameSubmitter for TransportSubmitter<'a> {
    fn submit(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        self.0.set_frames(left, right, rgba)
    }
}

/// Single entry point to an OpenXR session bound to a scene.
///
/// The caller drives the frame loop:
///
/// ```no_run
/// # use rust_openxr_bridge::{XrSession, ReferenceSpaceType};
/// # fn run(session: &mut XrSession) -> rust_openxr_bridge::XrResult<()> {
/// while session.poll_events()? {
///     if session.is_session_running() {
///         session.poll_actions()?;
///         session.render_views(ReferenceSpaceType::Stage)?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct XrSession {
    disable_runtime: bool,
    state: SessionState,
    graphics: Option<GraphicsApi>,
    transport: Option<Box<dyn XrTransport>>,
    actions: ActionRegistry,
    pipeline: PosePipeline,
    transformer: FrameTransformer,
    render_handler: Option<RenderHandler>,
    rig: Option<ViewRig>,
}

impl Drop for XrSession {
    fn drop(&mut self) {
        if self.transport.is_some() {
            if let Err(e) = self.destroy() {
                error!("Error destroying the OpenXR session: {}", e);
            }
        }
    }
}

impl XrSession {
    /// With `disable_runtime` every runtime call is answered by the stub transport.
    pub fn new(disable_runtime: bool) -> XrSession {
        XrSession {
            disable_runtime,
            state: SessionState::Uninitialized,
            graphics: None,
            transport: None,
            actions: ActionRegistry::new(),
            pipeline: PosePipeline::default(),
            transformer: FrameTransformer::default(),
            render_handler: None,
            rig: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transport_mode(&self) -> Option<TransportMode> {
        self.transport.as_ref().map(|t| t.mode())
    }

    pub fn graphics(&self) -> Option<GraphicsApi> {
        self.graphics
    }

    fn require(&self, allowed: &[SessionState], operation: &'static str) -> XrResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(XrError::Precondition { operation, state: self.state.name() })
        }
    }

    fn transport_mut(&mut self, operation: &'static str) -> XrResult<&mut Box<dyn XrTransport>> {
        let state = self.state.name();
        self.transport.as_mut().ok_or(XrError::Precondition { operation, state })
    }

    /// Selects the graphics API and connects to the runtime.
    ///
    /// `graphics` is a short name (`OpenGL`) or an extension name. On failure
    /// the session stays uninitialized.
    pub fn init(&mut self, graphics: &str, creator: &dyn XrTransportCreator) -> XrResult<()> {
        self.require(&[SessionState::Uninitialized], "init")?;
        let graphics = graphics.parse::<GraphicsApi>()?.ensure_supported()?;

        let transport = if self.disable_runtime {
            warn!("OpenXR runtime disabled, using the stub transport");
            stub_transport()
        } else {
            creator.new_transport()
        };
        let transport = match transport {
            Ok(transport) => transport,
            Err(e) => {
                error!("OpenXR initialization: {}", e);
                return Err(e);
            }
        };

        info!("OpenXR {:?} transport selected ({})", transport.mode(), graphics);
        self.graphics = Some(graphics);
        self.transport = Some(transport);
        self.state = SessionState::Initialized;
        Ok(())
    }

    /// Creates the runtime instance. The graphics extension selected at
    /// init is added to the requested extensions.
    pub fn create_instance(&mut self, info: InstanceInfo) -> XrResult<()> {
        self.require(&[SessionState::Initialized], "create_instance")?;
        let mut info = info;
        if let Some(graphics) = self.graphics {
            let extension = graphics.extension_name();
            if !info.extensions.iter().any(|e| e == extension) {
                info.extensions.push(extension.to_owned());
            }
        }
        self.transport_mut("create_instance")?.create_instance(&info)?;
        self.state = SessionState::InstanceCreated;
        Ok(())
    }

    pub fn get_system(&mut self, info: SystemInfo) -> XrResult<()> {
        self.require(&[SessionState::InstanceCreated], "get_system")?;
        self.transport_mut("get_system")?.get_system(&info)?;
        self.state = SessionState::SystemObtained;
        Ok(())
    }

    /// Creates the session. Actions must be subscribed before this call.
    pub fn create_session(&mut self) -> XrResult<()> {
        self.require(&[SessionState::SystemObtained], "create_session")?;
        self.transport_mut("create_session")?.create_session()?;
        self.state = SessionState::SessionCreated;
        Ok(())
    }

    pub fn is_session_running(&self) -> bool {
        match self.transport {
            Some(ref transport) => transport.is_session_running(),
            None => false,
        }
    }

    /// Handles runtime events. Returns `Ok(false)` when the frame loop must end.
    pub fn poll_events(&mut self) -> XrResult<bool> {
        self.require(&[SessionState::SessionCreated, SessionState::Running], "poll_events")?;
        let transport = self.transport_mut("poll_events")?;
        let keep_running = transport.poll_events()?;
        let running = transport.is_session_running();
        if self.state == SessionState::SessionCreated && running {
            info!("OpenXR session running");
            self.state = SessionState::Running;
        }
        Ok(keep_running)
    }

    /// Polls the input actions and calls their callbacks. The states are
    /// dispatched even when the runtime reports a failure.
    pub fn poll_actions(&mut self) -> XrResult<()> {
        self.require(&[SessionState::Running], "poll_actions")?;
        let capacity = self.actions.len();
        let polled = self.transport_mut("poll_actions")?.poll_actions(capacity);
        self.actions.dispatch_inputs(&polled.states);
        check(polled.success, "poll_actions")
    }

    /// Renders one frame, then delivers the pose actions of the frame.
    ///
    /// Without a render callback the internal one is installed on first use.
    pub fn render_views(&mut self, reference_space: ReferenceSpaceType) -> XrResult<()> {
        self.require(&[SessionState::Running], "render_views")?;
        if self.render_handler.is_none() {
            info!("Using the internal render callback");
            self.render_handler = Some(RenderHandler::Internal);
        }

        let state = self.state.name();
        let XrSession {
            ref mut transport,
            ref mut actions,
            ref pipeline,
            ref transformer,
            ref mut render_handler,
            ref mut rig,
            ..
        } = *self;
        let transport = transport.as_mut()
            .ok_or(XrError::Precondition { operation: "render_views", state })?;

        let mut render = |views: &[View], config_views: &[ViewConfigurationView], submitter: &mut dyn FrameSubmitter| {
            let mut sink = FrameSink::new(transformer, submitter);
            match render_handler {
                Some(RenderHandler::Custom(callback)) => callback(views, config_views, &mut sink),
                Some(RenderHandler::Internal) | None => match rig.as_mut() {
                    Some(rig) => {
                        if let Err(e) = rig.render(views, config_views, pipeline, &mut sink) {
                            log_frame_error(&e);
                        }
                    }
                    None => warn!("No view set up for the internal render callback, skipping frame"),
                },
            }
        };
        let polled = transport.render_views(reference_space, actions.pose_len(), &mut render);
        actions.dispatch_poses(&polled.states, |pose| pipeline.device_pose(pose))?;
        check(polled.success, "render_views")
    }

    /// Subscribes to an action. The type is inferred from the path when not
    /// given. Output actions take no callback.
    pub fn subscribe_action_event(&mut self,
                                  path: &str,
                                  action_type: Option<ActionType>,
                                  callback: Option<ActionCallback>,
                                  reference_space: ReferenceSpaceType) -> XrResult<()> {
        self.require(&[SessionState::SystemObtained], "subscribe_action_event")?;
        let action_type = ActionRegistry::resolve(path, action_type, callback.is_some())?;
        self.transport_mut("subscribe_action_event")?.add_action(path, action_type, reference_space)?;
        self.actions.subscribe(path, Some(action_type), callback, reference_space)?;
        Ok(())
    }

    /// Sets the render callback. `None` selects the internal one.
    pub fn subscribe_render_event(&mut self, callback: Option<RenderCallback>) -> XrResult<()> {
        self.require(&[SessionState::Initialized, SessionState::InstanceCreated, SessionState::SystemObtained,
                       SessionState::SessionCreated, SessionState::Running], "subscribe_render_event")?;
        self.render_handler = Some(match callback {
            Some(callback) => RenderHandler::Custom(callback),
            None => RenderHandler::Internal,
        });
        Ok(())
    }

    pub fn apply_haptic_feedback(&mut self, path: &str, haptic: &HapticFeedback) -> XrResult<()> {
        self.require(&[SessionState::SessionCreated, SessionState::Running], "apply_haptic_feedback")?;
        self.transport_mut("apply_haptic_feedback")?.apply_haptic_feedback(path, haptic)
    }

    pub fn stop_haptic_feedback(&mut self, path: &str) -> XrResult<()> {
        self.require(&[SessionState::SessionCreated, SessionState::Running], "stop_haptic_feedback")?;
        self.transport_mut("stop_haptic_feedback")?.stop_haptic_feedback(path)
    }

    /// Recommended image size of each view.
    pub fn recommended_resolutions(&mut self) -> XrResult<Vec<(u32, u32)>> {
        let views = self.transport_mut("recommended_resolutions")?.view_configuration_views()?;
        Ok(views.iter().map(|v| v.recommended_size()).collect())
    }

    /// Origin of the tracking space in the scene. The rotation is XYZ Euler
    /// angles in degrees.
    pub fn set_reference_system_pose(&mut self, position: Option<[f64; 3]>, rotation: Option<[f64; 3]>) {
        self.pipeline.reference = ReferenceFrame::new(position, rotation);
    }

    /// Corrective rotations of the eye cameras, in radians. Replaces any
    /// previous rectification.
    pub fn set_stereo_rectification(&mut self, x: f64, y: f64, z: f64) {
        self.pipeline.rectification = RectificationPair::build(x, y, z);
    }

    pub fn set_meters_per_unit(&mut self, meters_per_unit: f64) -> XrResult<()> {
        self.pipeline.set_meters_per_unit(meters_per_unit)
    }

    pub fn set_frame_transformations(&mut self, transformations: FrameTransformations) {
        self.transformer.set_transformations(transformations);
    }

    pub fn pose_pipeline(&self) -> &PosePipeline {
        &self.pipeline
    }

    /// Sets up the cameras driven by the internal render callback. A missing
    /// right camera gives a single view setup.
    pub fn setup_stereo_view(&mut self,
                             stage: Box<dyn SceneStage>,
                             left: CameraDesc,
                             right: Option<CameraDesc>,
                             camera_properties: Option<&[(String, AttributeValue)]>) -> XrResult<()> {
        let defaults = default_camera_properties();
        let properties = camera_properties.unwrap_or(&defaults);
        self.rig = Some(ViewRig::stereo(stage, left, right, properties)?);
        Ok(())
    }

    pub fn setup_mono_view(&mut self,
                           stage: Box<dyn SceneStage>,
                           camera: CameraDesc,
                           camera_properties: Option<&[(String, AttributeValue)]>) -> XrResult<()> {
        let defaults = default_camera_properties();
        let properties = camera_properties.unwrap_or(&defaults);
        self.rig = Some(ViewRig::mono(stage, camera, properties)?);
        Ok(())
    }

    pub fn view_rig(&self) -> Option<&ViewRig> {
        self.rig.as_ref()
    }

    /// Submits images outside of a render callback.
    pub fn set_frames(&mut self,
                      config_views: &[ViewConfigurationView],
                      left: &FrameBuffer,
                      right: Option<&FrameBuffer>) -> XrResult<()> {
        let state = self.state.name();
        let transport = self.transport.as_mut()
            .ok_or(XrError::Precondition { operation: "set_frames", state })?;
        let mut submitter = TransportSubmitter(&mut **transport);
        FrameSink::new(&self.transformer, &mut submitter).set_frames(config_views, left, right)
    }

    /// Releases the runtime application. Later calls are no-ops.
    pub fn destroy(&mut self) -> XrResult<()> {
        let result = match self.transport.take() {
            Some(mut transport) => transport.destroy(),
            None => Ok(()),
        };
        self.state = SessionState::Destroyed;
        result
    }
}

fn log_frame_error(e: &XrError) {
    match *e {
        XrError::Frame(ref msg) => warn!("Skipping frame: {}", msg),
        ref e => error!("Render callback: {}", e),
    }
}

#[cfg(feature = "mock")]
fn stub_transport() -> XrResult<Box<dyn XrTransport>> {
    use crate::api::MockTransportCreator;
    MockTransportCreator::new().new_transport()
}

#[cfg(not(feature = "mock"))]
fn stub_transport() -> XrResult<Box<dyn XrTransport>> {
    Err(XrError::Unsupported("the stub transport requires the mock feature".into()))
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::api::MockTransportCreator;
    use crate::view_rig::fakes::{FakeSensor, FakeStage};
    use rust_openxr_bridge_api::mock::MockXrControlMsg;
    use rust_openxr_bridge_api::{ActionPoseState, ActionState, ActionStateValue, ActionValue, Pose, PixelFormat};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FailingCreator;

    impl XrTransportCreator for FailingCreator {
        fn new_transport(&self) -> XrResult<Box<dyn XrTransport>> {
            Err(XrError::Library("xrlib_c.so: cannot open shared object file".into()))
        }
    }

    fn stub_session() -> XrSession {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = XrSession::new(true);
        session.init("OpenGL", &FailingCreator).unwrap();
        session
    }

    fn running(session: &mut XrSession) {
        session.create_instance(InstanceInfo::default()).unwrap();
        session.get_system(SystemInfo::default()).unwrap();
        session.create_session().unwrap();
        assert_eq!(session.poll_events(), Ok(true));
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn stub_session_runs_one_frame() {
        let mut session = stub_session();
        assert_eq!(session.transport_mode(), Some(TransportMode::Stub));
        running(&mut session);
        assert_eq!(session.poll_actions(), Ok(()));
        assert_eq!(session.render_views(ReferenceSpaceType::Stage), Ok(()));
        assert!(session.is_session_running());
        assert_eq!(session.recommended_resolutions().unwrap(), vec![(512, 512), (1024, 1024)]);
    }

    #[test]
    fn stub_session_reads_both_cameras_every_frame() {
        let mut session = stub_session();
        running(&mut session);
        let stage = FakeStage::default();
        let (left, right) = (FakeSensor::shaded(1), FakeSensor::shaded(2));
        session.setup_stereo_view(Box::new(stage.clone()),
                                  CameraDesc::new("/Left", Box::new(left.clone())),
                                  Some(CameraDesc::new("/Right", Box::new(right.clone()))),
                                  None).unwrap();

        session.render_views(ReferenceSpaceType::Stage).unwrap();

        assert_eq!(left.0.borrow().resolution, Some((512, 512)));
        assert_eq!(right.0.borrow().resolution, Some((1024, 1024)));
        assert!(stage.attribute("/Left", "xformOp:transform").is_some());
        assert!(stage.attribute("/Right", "xformOp:transform").is_some());
    }

    #[test]
    fn setup_calls_must_follow_the_lifecycle() {
        let mut session = stub_session();
        session.create_instance(InstanceInfo::default()).unwrap();
        assert_eq!(session.create_session(),
                   Err(XrError::Precondition { operation: "create_session", state: "instance created" }));
        assert_eq!(session.state(), SessionState::InstanceCreated);
        assert!(session.poll_actions().is_err());
        assert!(session.create_instance(InstanceInfo::default()).is_err());
    }

    #[test]
    fn init_failures_leave_the_session_uninitialized() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut session = XrSession::new(false);
        assert!(matches!(session.init("Glide", &FailingCreator), Err(XrError::InvalidInput(_))));
        assert!(matches!(session.init("Vulkan", &FailingCreator), Err(XrError::Unsupported(_))));
        assert!(matches!(session.init("OpenGL", &FailingCreator), Err(XrError::Library(_))));
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.transport_mode(), None);
        assert!(!session.is_session_running());
    }

    #[test]
    fn subscriptions_are_taken_before_the_session_only() {
        let mut session = stub_session();
        session.create_instance(InstanceInfo::default()).unwrap();
        let cb = || -> Option<ActionCallback> { Some(Box::new(|_: &str, _: ActionValue| {})) };
        assert!(session.subscribe_action_event("/a/click", None, cb(), ReferenceSpaceType::Local).is_err());
        session.get_system(SystemInfo::default()).unwrap();
        session.subscribe_action_event("/a/click", None, cb(), ReferenceSpaceType::Local).unwrap();
        assert!(matches!(session.subscribe_action_event("/a/trigger", None, cb(), ReferenceSpaceType::Local),
                         Err(XrError::InvalidInput(_))));
        session.create_session().unwrap();
        assert!(session.subscribe_action_event("/a/value", None, cb(), ReferenceSpaceType::Local).is_err());
    }

    #[test]
    fn scripted_frame_dispatches_actions_and_renders_the_rig() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (creator, remote) = MockTransportCreator::new_with_remote();
        let mut session = XrSession::new(false);
        session.init("XR_KHR_opengl_enable", &creator).unwrap();
        session.create_instance(InstanceInfo::default()).unwrap();
        session.get_system(SystemInfo::default()).unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let record = |log: &Rc<RefCell<Vec<(String, ActionValue)>>>| -> Option<ActionCallback> {
            let log = log.clone();
            Some(Box::new(move |path: &str, value: ActionValue| log.borrow_mut().push((path.to_owned(), value))))
        };
        session.subscribe_action_event("/user/hand/left/input/select/click", None, record(&log),
                                       ReferenceSpaceType::Local).unwrap();
        session.subscribe_action_event("/user/hand/left/input/grip/pose", None, record(&log),
                                       ReferenceSpaceType::Stage).unwrap();
        session.create_session().unwrap();

        let stage = FakeStage::default();
        let sensor = FakeSensor::shaded(3);
        session.setup_mono_view(Box::new(stage.clone()), CameraDesc::new("/Cam", Box::new(sensor.clone())), None)
            .unwrap();
        session.set_meters_per_unit(0.5).unwrap();
        session.set_reference_system_pose(Some([1.0, 1.0, 1.0]), None);

        let pose = Pose { position: [1.0, 2.0, 3.0], orientation: [0.0, 0.0, 0.0, 1.0] };
        remote.send(MockXrControlMsg::SetActionStates(vec![ActionState {
            path: "/user/hand/left/input/select/click".into(),
            is_active: true,
            value: ActionStateValue::Boolean(true),
        }])).unwrap();
        remote.send(MockXrControlMsg::SetPoseStates(vec![ActionPoseState {
            path: "/user/hand/left/input/grip/pose".into(),
            is_active: true,
            pose,
        }])).unwrap();
        remote.send(MockXrControlMsg::SetViews(vec![View::default(); 2])).unwrap();

        assert_eq!(session.poll_events(), Ok(true));
        session.poll_actions().unwrap();
        session.render_views(ReferenceSpaceType::Stage).unwrap();

        let log = log.borrow();
        assert_eq!(log[0], ("/user/hand/left/input/select/click".to_owned(), ActionValue::Boolean(true)));
        match log[1].1 {
            ActionValue::Pose(host) => assert_eq!(host.position, [3.0, -5.0, 5.0]),
            ref other => panic!("unexpected {:?}", other),
        }
        // the mono camera got the recommended size of the first view
        assert_eq!(sensor.0.borrow().resolution, Some((512, 512)));
        assert!(stage.attribute("/Cam", "xformOp:transform").is_some());
    }

    #[test]
    fn custom_render_callback_replaces_the_internal_one() {
        let (creator, remote) = MockTransportCreator::new_with_remote();
        let mut session = XrSession::new(false);
        session.init("OpenGL", &creator).unwrap();
        running(&mut session);
        remote.send(MockXrControlMsg::SetViews(vec![View::default()])).unwrap();
        session.set_frame_transformations(FrameTransformations { fit: true, flip: None });

        let frames = Rc::new(RefCell::new(0));
        let counter = frames.clone();
        session.subscribe_render_event(Some(Box::new(move |_: &[View], configs: &[ViewConfigurationView], sink: &mut FrameSink| {
            let frame = FrameBuffer::new(16, 8, PixelFormat::Rgba, vec![0; 16 * 8 * 4]).unwrap();
            sink.set_frames(configs, &frame, None).unwrap();
            *counter.borrow_mut() += 1;
        }))).unwrap();
        session.render_views(ReferenceSpaceType::Local).unwrap();
        session.render_views(ReferenceSpaceType::Local).unwrap();
        assert_eq!(*frames.borrow(), 2);
    }

    #[test]
    fn failed_render_still_delivers_poses() {
        let (creator, remote) = MockTransportCreator::new_with_remote();
        let mut session = XrSession::new(false);
        session.init("OpenGL", &creator).unwrap();
        session.create_instance(InstanceInfo::default()).unwrap();
        session.get_system(SystemInfo::default()).unwrap();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        session.subscribe_action_event("/p/pose", None, Some(Box::new(move |_: &str, _: ActionValue| {
            *counter.borrow_mut() += 1;
        })), ReferenceSpaceType::Stage).unwrap();
        session.create_session().unwrap();
        session.poll_events().unwrap();

        remote.send(MockXrControlMsg::SetPoseStates(vec![ActionPoseState {
            path: "/p/pose".into(), is_active: true, pose: Pose::default(),
        }])).unwrap();
        remote.send(MockXrControlMsg::FailCall("render_views")).unwrap();
        assert_eq!(session.render_views(ReferenceSpaceType::Stage), Err(XrError::RuntimeCall("render_views")));
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn destroy_is_final() {
        let mut session = stub_session();
        running(&mut session);
        session.destroy().unwrap();
        assert_eq!(session.state(), SessionState::Destroyed);
        assert!(!session.is_session_running());
        assert!(session.poll_events().is_err());
        assert!(session.destroy().is_ok());
    }

    #[test]
    fn zero_meters_per_unit_is_rejected() {
        let mut session = XrSession::new(true);
        assert!(matches!(session.set_meters_per_unit(0.0), Err(XrError::InvalidInput(_))));
        assert_eq!(session.pose_pipeline().meters_per_unit(), 1.0);
    }
}
