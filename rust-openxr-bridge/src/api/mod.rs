#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use self::mock::{MockTransport, MockTransportCreator};

#[cfg(feature = "ffi")]
mod ffi;
#[cfg(feature = "ffi")]
pub use self::ffi::{FfiTransport, FfiTransportCreator, XrLibrary, BRIDGE_LIBRARY};

mod record;
pub use self::record::{Record, RecordRenderFn, RecordRuntime, RecordTransport, RecordTransportCreator};
