use rust_openxr_bridge_api::{check, ActionPoseState, ActionState, ActionType, FrameBuffer, FrameSubmitter,
                             HapticFeedback, InstanceInfo, Polled, ReferenceSpaceType, RenderFn, SystemInfo,
                             TransportMode, View, ViewConfigurationView, XrError, XrResult, XrTransport};
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;
use std::slice;

use super::binding::{self, XrView, XrViewConfigurationView};
use super::library::{SetFrames, XrLibrary};

/// Submits frames straight to the native bridge. Only valid while the
/// application handle it was made from is alive.
#[derive(Clone, Copy)]
pub struct NativeSubmitter {
    app: *mut c_void,
    set_frames: SetFrames,
}

impl NativeSubmitter {
    pub fn new(app: *mut c_void, set_frames: SetFrames) -> NativeSubmitter {
        NativeSubmitter { app, set_frames }
    }
}

impl FrameSubmitter for NativeSubmitter {
    fn submit(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        let (right_width, right_height, right_data) = match right {
            Some(right) => (right.width as c_int, right.height as c_int, right.data.as_ptr() as *const c_void),
            None => (0, 0, ptr::null()),
        };
        let success = unsafe {
            (self.set_frames)(self.app,
                              left.width as c_int, left.height as c_int, left.data.as_ptr() as *const c_void,
                              right_width, right_height, right_data,
                              rgba)
        };
        check(success, "set_frames")
    }
}

// The render closure of the `render_views` call in progress on this thread.
struct RenderScope {
    // Points to a `&mut RenderFn` living on the caller's stack
    render: *mut c_void,
    submitter: NativeSubmitter,
}

thread_local! {
    static RENDER_SCOPE: RefCell<Option<RenderScope>> = RefCell::new(None);
}

/// Installed once as the native render callback. Forwards the views of the
/// frame to the closure passed to the current `render_views` call.
pub extern "C" fn render_trampoline(num_views: c_int,
                                    views: *const XrView,
                                    config_views: *const XrViewConfigurationView) {
    let scope = RENDER_SCOPE.with(|slot| slot.borrow_mut().take());
    let mut scope = match scope {
        Some(scope) => scope,
        None => {
            warn!("Render callback invoked outside of a render call");
            return;
        }
    };

    let count = num_views.max(0) as usize;
    let views: Vec<View> = unsafe { decode(views, count) };
    let config_views: Vec<ViewConfigurationView> = unsafe { decode(config_views, count) };
    unsafe {
        let render = &mut *(scope.render as *mut &mut RenderFn<'static>);
        render(&views, &config_views, &mut scope.submitter);
    }
    RENDER_SCOPE.with(|slot| *slot.borrow_mut() = Some(scope));
}

unsafe fn decode<'a, R, T>(records: *const R, count: usize) -> Vec<T>
    where R: 'a, T: From<&'a R>
{
    if records.is_null() || count == 0 {
        return Vec::new();
    }
    slice::from_raw_parts(records, count).iter().map(T::from).collect()
}

/// Runs `f` with `render` installed as the target of the render trampoline.
pub fn with_render_scope<R, F>(render: &mut RenderFn<'_>, submitter: NativeSubmitter, f: F) -> R
    where F: FnOnce() -> R
{
    let mut render = render;
    let pointer = &mut render as *mut &mut RenderFn<'_> as *mut c_void;
    let previous = RENDER_SCOPE.with(|slot| slot.borrow_mut().replace(RenderScope { render: pointer, submitter }));
    let result = f();
    RENDER_SCOPE.with(|slot| *slot.borrow_mut() = previous);
    result
}

/// Transport calling the native bridge through its C entry points.
pub struct FfiTransport {
    lib: XrLibrary,
    app: *mut c_void,
    destroyed: bool,
}

impl FfiTransport {
    pub fn new(lib: XrLibrary) -> XrResult<FfiTransport> {
        let app = unsafe { (lib.open_xr_application)() };
        if app.is_null() {
            return Err(XrError::Library("openXrApplication returned no application".into()));
        }
        unsafe { (lib.set_render_callback)(app, render_trampoline) };
        Ok(FfiTransport { lib, app, destroyed: false })
    }

    fn c_path(path: &str) -> XrResult<CString> {
        CString::new(path).map_err(|_| XrError::invalid(format!("{:?} contains a nul byte", path)))
    }

    fn submitter(&self) -> NativeSubmitter {
        NativeSubmitter::new(self.app, *self.lib.set_frames)
    }
}

impl Drop for FfiTransport {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            error!("Error destroying the OpenXR application: {}", e);
        }
    }
}

impl XrTransport for FfiTransport {
    fn mode(&self) -> TransportMode {
        TransportMode::Struct
    }

    fn destroy(&mut self) -> XrResult<()> {
        if self.destroyed {
            return Ok(());
        }
        self.destroyed = true;
        check(unsafe { (self.lib.destroy)(self.app) }, "destroy")
    }

    fn is_session_running(&self) -> bool {
        !self.destroyed && unsafe { (self.lib.is_session_running)(self.app) }
    }

    fn create_instance(&mut self, info: &InstanceInfo) -> XrResult<()> {
        let application_name = FfiTransport::c_path(&info.application_name)?;
        let engine_name = FfiTransport::c_path(&info.engine_name)?;
        let api_layers = info.api_layers.iter().map(|l| FfiTransport::c_path(l)).collect::<XrResult<Vec<_>>>()?;
        let extensions = info.extensions.iter().map(|e| FfiTransport::c_path(e)).collect::<XrResult<Vec<_>>>()?;
        let api_layer_ptrs: Vec<*const c_char> = api_layers.iter().map(|l| l.as_ptr()).collect();
        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|e| e.as_ptr()).collect();

        let success = unsafe {
            (self.lib.create_instance)(self.app,
                                       application_name.as_ptr(),
                                       engine_name.as_ptr(),
                                       api_layer_ptrs.as_ptr(), api_layer_ptrs.len() as c_int,
                                       extension_ptrs.as_ptr(), extension_ptrs.len() as c_int)
        };
        check(success, "create_instance")
    }

    fn get_system(&mut self, info: &SystemInfo) -> XrResult<()> {
        let success = unsafe {
            (self.lib.get_system)(self.app,
                                  info.form_factor.raw(),
                                  info.blend_mode.raw(),
                                  info.view_configuration_type.raw())
        };
        check(success, "get_system")
    }

    fn create_session(&mut self) -> XrResult<()> {
        check(unsafe { (self.lib.create_session)(self.app) }, "create_session")
    }

    fn poll_events(&mut self) -> XrResult<bool> {
        let mut exit = false;
        check(unsafe { (self.lib.poll_events)(self.app, &mut exit) }, "poll_events")?;
        Ok(!exit)
    }

    fn poll_actions(&mut self, capacity: usize) -> Polled<ActionState> {
        let mut records = vec![binding::ActionState::empty(); capacity];
        let success = unsafe { (self.lib.poll_actions)(self.app, records.as_mut_ptr(), capacity as c_int) };
        Polled::new(success, unsafe { binding::decode_action_states(&records) })
    }

    fn render_views(&mut self,
                    reference_space: ReferenceSpaceType,
                    capacity: usize,
                    render: &mut RenderFn<'_>) -> Polled<ActionPoseState> {
        let mut records = vec![binding::ActionPoseState::empty(); capacity];
        let (app, render_views) = (self.app, *self.lib.render_views);
        let success = with_render_scope(render, self.submitter(), || unsafe {
            render_views(app, reference_space.raw(), records.as_mut_ptr(), capacity as c_int)
        });
        Polled::new(success, unsafe { binding::decode_pose_states(&records) })
    }

    fn add_action(&mut self, path: &str, action_type: ActionType, reference_space: ReferenceSpaceType) -> XrResult<()> {
        let path = FfiTransport::c_path(path)?;
        let success = unsafe {
            (self.lib.add_action)(self.app, path.as_ptr(), action_type.raw(), reference_space.raw())
        };
        check(success, "add_action")
    }

    fn apply_haptic_feedback(&mut self, path: &str, haptic: &HapticFeedback) -> XrResult<()> {
        let path = FfiTransport::c_path(path)?;
        let success = unsafe {
            (self.lib.apply_haptic_feedback)(self.app, path.as_ptr(), haptic.amplitude, haptic.duration, haptic.frequency)
        };
        check(success, "apply_haptic_feedback")
    }

    fn stop_haptic_feedback(&mut self, path: &str) -> XrResult<()> {
        let path = FfiTransport::c_path(path)?;
        check(unsafe { (self.lib.stop_haptic_feedback)(self.app, path.as_ptr()) }, "stop_haptic_feedback")
    }

    fn view_configuration_views(&mut self) -> XrResult<Vec<ViewConfigurationView>> {
        let count = unsafe { (self.lib.get_view_configuration_views_size)(self.app) }.max(0);
        let mut records = vec![XrViewConfigurationView::empty(); count as usize];
        check(unsafe { (self.lib.get_view_configuration_views)(self.app, records.as_mut_ptr(), count) },
              "view_configuration_views")?;
        Ok(records.iter().map(ViewConfigurationView::from).collect())
    }

    fn set_frames(&mut self, left: &FrameBuffer, right: Option<&FrameBuffer>, rgba: bool) -> XrResult<()> {
        self.submitter().submit(left, right, rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::binding::{XrFovf, XrPosef};
    use rust_openxr_bridge_api::PixelFormat;
    use std::cell::Cell;

    thread_local! {
        static SUBMITTED: Cell<(c_int, c_int, c_int, c_int, bool)> = Cell::new((0, 0, 0, 0, false));
    }

    unsafe extern "C" fn fake_set_frames(_app: *mut c_void,
                                         left_width: c_int, left_height: c_int, _left: *const c_void,
                                         right_width: c_int, right_height: c_int, _right: *const c_void,
                                         rgba: bool) -> bool {
        SUBMITTED.with(|s| s.set((left_width, left_height, right_width, right_height, rgba)));
        true
    }

    #[test]
    fn trampoline_forwards_views_to_the_active_closure() {
        let xr_views = [
            XrView { type_: 7, next: ptr::null_mut(), pose: XrPosef::default(), fov: XrFovf { angle_left: -0.5, ..XrFovf::default() } },
            XrView { type_: 7, next: ptr::null_mut(), pose: XrPosef::default(), fov: XrFovf::default() },
        ];
        let xr_configs = [XrViewConfigurationView::from(&ViewConfigurationView::with_recommended_size(3, 2)); 2];
        let frame = FrameBuffer::new(3, 2, PixelFormat::Rgba, vec![0; 24]).unwrap();

        let mut seen: Vec<View> = Vec::new();
        let submitter = NativeSubmitter::new(ptr::null_mut(), fake_set_frames);
        let mut render = |views: &[View], configs: &[ViewConfigurationView], sink: &mut dyn FrameSubmitter| {
            seen.extend_from_slice(views);
            assert_eq!(configs[1].recommended_size(), (3, 2));
            sink.submit(&frame, None, true).unwrap();
        };
        with_render_scope(&mut render, submitter, || {
            render_trampoline(2, xr_views.as_ptr(), xr_configs.as_ptr());
        });

        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].fov.angle_left, -0.5);
        assert_eq!(SUBMITTED.with(|s| s.get()), (3, 2, 0, 0, true));
    }

    #[test]
    fn trampoline_without_scope_is_ignored() {
        let _ = env_logger::builder().is_test(true).try_init();
        render_trampoline(0, ptr::null(), ptr::null());
        assert!(RENDER_SCOPE.with(|slot| slot.borrow().is_none()));
    }
}
