mod service;

use rust_openxr_bridge_api::mock::MockXrControlMsg;
use rust_openxr_bridge_api::{XrResult, XrTransport, XrTransportCreator};
use std::cell::RefCell;
use std::sync::mpsc::{channel, Receiver, Sender};

pub use self::service::MockTransport;

/// Creates the stub transport used when the runtime is disabled.
pub struct MockTransportCreator {
    // Handed to the first transport created
    remote: RefCell<Option<Receiver<MockXrControlMsg>>>,
}

impl MockTransportCreator {
    pub fn new() -> MockTransportCreator {
        MockTransportCreator { remote: RefCell::new(None) }
    }

    /// The returned sender scripts the transport created next.
    pub fn new_with_remote() -> (MockTransportCreator, Sender<MockXrControlMsg>) {
        let (send, rcv) = channel();
        let creator = MockTransportCreator { remote: RefCell::new(Some(rcv)) };
        (creator, send)
    }
}

impl Default for MockTransportCreator {
    fn default() -> MockTransportCreator {
        MockTransportCreator::new()
    }
}

impl XrTransportCreator for MockTransportCreator {
    fn new_transport(&self) -> XrResult<Box<dyn XrTransport>> {
        Ok(Box::new(match self.remote.borrow_mut().take() {
            Some(rcv) => MockTransport::new_with_receiver(rcv),
            None => MockTransport::new(),
        }))
    }
}
