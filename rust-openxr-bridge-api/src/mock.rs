use crate::{ActionPoseState, ActionState, View, ViewConfigurationView};

/// Messages scripting the stub runtime from another place in the program.
pub enum MockXrControlMsg {
    /// Reported by the next action polls until replaced.
    SetActionStates(Vec<ActionState>),
    /// Reported by the next render calls until replaced.
    SetPoseStates(Vec<ActionPoseState>),
    /// Views handed to the render callback, two identity views by default.
    /// No views, no callback.
    SetViews(Vec<View>),
    SetViewConfigurationViews(Vec<ViewConfigurationView>),
    SetSessionRunning(bool),
    /// Makes the next event poll end the frame loop.
    RequestExit,
    /// Makes the named runtime call report failure.
    FailCall(&'static str),
}
