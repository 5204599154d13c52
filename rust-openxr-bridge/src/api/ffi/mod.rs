pub(super) mod binding;
mod library;
mod service;

use rust_openxr_bridge_api::{XrResult, XrTransport, XrTransportCreator};
use std::path::PathBuf;

pub use self::library::{XrLibrary, BRIDGE_LIBRARY};
pub use self::service::FfiTransport;

/// Creates transports backed by the native bridge library found in `lib_dir`.
pub struct FfiTransportCreator {
    lib_dir: PathBuf,
}

impl FfiTransportCreator {
    pub fn new<P: Into<PathBuf>>(lib_dir: P) -> FfiTransportCreator {
        FfiTransportCreator { lib_dir: lib_dir.into() }
    }
}

impl XrTransportCreator for FfiTransportCreator {
    fn new_transport(&self) -> XrResult<Box<dyn XrTransport>> {
        let lib = unsafe { XrLibrary::open(&self.lib_dir)? };
        let transport = FfiTransport::new(lib)?;
        info!("OpenXR initialized using the C interface ({})", self.lib_dir.display());
        Ok(Box::new(transport))
    }
}
