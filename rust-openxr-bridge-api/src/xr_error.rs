use thiserror::Error;

pub type XrResult<T> = Result<T, XrError>;

/// Errors surfaced by the bridge and its transports.
///
/// `InvalidInput` and `Precondition` are programmer errors and are reported
/// at call time. `RuntimeCall` and `Frame` describe failures the caller may
/// retry on a later frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XrError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} called in state {state}")]
    Precondition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("runtime call {0} failed")]
    RuntimeCall(&'static str),

    #[error("unable to load runtime library: {0}")]
    Library(String),

    #[error("{0} is not implemented yet")]
    Unsupported(String),

    #[error("frame skipped: {0}")]
    Frame(String),
}

impl XrError {
    pub fn invalid<S: Into<String>>(msg: S) -> XrError {
        XrError::InvalidInput(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        match *self {
            XrError::RuntimeCall(_) | XrError::Frame(_) => true,
            _ => false,
        }
    }
}

/// Turns a runtime success flag into a result.
pub fn check(success: bool, call: &'static str) -> XrResult<()> {
    if success {
        Ok(())
    } else {
        Err(XrError::RuntimeCall(call))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_failures_are_retryable() {
        assert!(XrError::RuntimeCall("pollActions").is_retryable());
        assert!(XrError::Frame("empty".into()).is_retryable());
        assert!(!XrError::invalid("zero").is_retryable());
        assert!(!XrError::Precondition { operation: "create_session", state: "Initialized" }.is_retryable());
    }

    #[test]
    fn check_maps_false_to_runtime_call() {
        assert_eq!(check(true, "createSession"), Ok(()));
        assert_eq!(check(false, "createSession"), Err(XrError::RuntimeCall("createSession")));
    }
}
