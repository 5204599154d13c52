use libloading as lib;
#[cfg(unix)]
use libloading::os::unix::Symbol as Symbol;
#[cfg(windows)]
use libloading::os::windows::Symbol as Symbol;
use rust_openxr_bridge_api::{XrError, XrResult};
use std::os::raw::{c_char, c_float, c_int, c_void};
use std::path::Path;

use super::binding::{ActionPoseState, ActionState, XrView, XrViewConfigurationView};

#[cfg(unix)]
pub const BRIDGE_LIBRARY: &str = "xrlib_c.so";
#[cfg(windows)]
pub const BRIDGE_LIBRARY: &str = "xrlib_c.dll";

// Loaded with global symbol visibility ahead of the bridge
#[cfg(unix)]
const PRELOAD: &[&str] = &["libGL.so", "libSDL2.so", "libopenxr_loader.so"];
#[cfg(windows)]
const PRELOAD: &[&str] = &[];

pub type RenderCallback = extern "C" fn(c_int, *const XrView, *const XrViewConfigurationView);

// xrlib_c entry points
pub type OpenXrApplication = unsafe extern "C" fn() -> *mut c_void;
pub type Destroy = unsafe extern "C" fn(*mut c_void) -> bool;
pub type IsSessionRunning = unsafe extern "C" fn(*mut c_void) -> bool;
pub type CreateInstance = unsafe extern "C" fn(*mut c_void, *const c_char, *const c_char,
                                               *const *const c_char, c_int,
                                               *const *const c_char, c_int) -> bool;
pub type GetSystem = unsafe extern "C" fn(*mut c_void, c_int, c_int, c_int) -> bool;
pub type CreateSession = unsafe extern "C" fn(*mut c_void) -> bool;
pub type PollEvents = unsafe extern "C" fn(*mut c_void, *mut bool) -> bool;
pub type PollActions = unsafe extern "C" fn(*mut c_void, *mut ActionState, c_int) -> bool;
pub type RenderViews = unsafe extern "C" fn(*mut c_void, c_int, *mut ActionPoseState, c_int) -> bool;
pub type AddAction = unsafe extern "C" fn(*mut c_void, *const c_char, c_int, c_int) -> bool;
pub type ApplyHapticFeedback = unsafe extern "C" fn(*mut c_void, *const c_char, c_float, i64, c_float) -> bool;
pub type StopHapticFeedback = unsafe extern "C" fn(*mut c_void, *const c_char) -> bool;
pub type GetViewConfigurationViewsSize = unsafe extern "C" fn(*mut c_void) -> c_int;
pub type GetViewConfigurationViews = unsafe extern "C" fn(*mut c_void, *mut XrViewConfigurationView, c_int) -> bool;
pub type SetRenderCallback = unsafe extern "C" fn(*mut c_void, RenderCallback);
pub type SetFrames = unsafe extern "C" fn(*mut c_void,
                                          c_int, c_int, *const c_void,
                                          c_int, c_int, *const c_void,
                                          bool) -> bool;

pub struct XrLibrary {
    _lib: lib::Library,
    _preloaded: Vec<lib::Library>,
    pub open_xr_application: Symbol<OpenXrApplication>,
    pub destroy: Symbol<Destroy>,
    pub is_session_running: Symbol<IsSessionRunning>,
    pub create_instance: Symbol<CreateInstance>,
    pub get_system: Symbol<GetSystem>,
    pub create_session: Symbol<CreateSession>,
    pub poll_events: Symbol<PollEvents>,
    pub poll_actions: Symbol<PollActions>,
    pub render_views: Symbol<RenderViews>,
    pub add_action: Symbol<AddAction>,
    pub apply_haptic_feedback: Symbol<ApplyHapticFeedback>,
    pub stop_haptic_feedback: Symbol<StopHapticFeedback>,
    pub get_view_configuration_views_size: Symbol<GetViewConfigurationViewsSize>,
    pub get_view_configuration_views: Symbol<GetViewConfigurationViews>,
    pub set_render_callback: Symbol<SetRenderCallback>,
    pub set_frames: Symbol<SetFrames>,
}

impl XrLibrary {
    /// Loads the bridge library and its runtime dependencies from `dir`.
    ///
    /// # Safety
    /// Loading runs the libraries' initialisers; the files must be the
    /// bridge build this crate was written against.
    pub unsafe fn open(dir: &Path) -> XrResult<XrLibrary> {
        let mut preloaded = Vec::with_capacity(PRELOAD.len());
        for name in PRELOAD {
            preloaded.push(open_global(&dir.join(name))?);
        }
        let lib = open_global(&dir.join(BRIDGE_LIBRARY))?;

        Ok(XrLibrary {
            open_xr_application: symbol(&lib, b"openXrApplication\0")?,
            destroy: symbol(&lib, b"destroy\0")?,
            is_session_running: symbol(&lib, b"isSessionRunning\0")?,
            create_instance: symbol(&lib, b"createInstance\0")?,
            get_system: symbol(&lib, b"getSystem\0")?,
            create_session: symbol(&lib, b"createSession\0")?,
            poll_events: symbol(&lib, b"pollEvents\0")?,
            poll_actions: symbol(&lib, b"pollActions\0")?,
            render_views: symbol(&lib, b"renderViews\0")?,
            add_action: symbol(&lib, b"addAction\0")?,
            apply_haptic_feedback: symbol(&lib, b"applyHapticFeedback\0")?,
            stop_haptic_feedback: symbol(&lib, b"stopHapticFeedback\0")?,
            get_view_configuration_views_size: symbol(&lib, b"getViewConfigurationViewsSize\0")?,
            get_view_configuration_views: symbol(&lib, b"getViewConfigurationViews\0")?,
            set_render_callback: symbol(&lib, b"setRenderCallback\0")?,
            set_frames: symbol(&lib, b"setFrames\0")?,
            _lib: lib,
            _preloaded: preloaded,
        })
    }
}

unsafe fn symbol<T>(lib: &lib::Library, name: &[u8]) -> XrResult<Symbol<T>> {
    lib.get::<T>(name)
        .map(|symbol| symbol.into_raw())
        .map_err(|e| XrError::Library(format!("missing symbol {}: {}",
                                              String::from_utf8_lossy(&name[..name.len() - 1]), e)))
}

#[cfg(unix)]
unsafe fn open_global(path: &Path) -> XrResult<lib::Library> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LAZY};
    Library::open(Some(path), RTLD_GLOBAL | RTLD_LAZY)
        .map(lib::Library::from)
        .map_err(|e| XrError::Library(format!("{}: {}", path.display(), e)))
}

#[cfg(windows)]
unsafe fn open_global(path: &Path) -> XrResult<lib::Library> {
    lib::Library::new(path).map_err(|e| XrError::Library(format!("{}: {}", path.display(), e)))
}
