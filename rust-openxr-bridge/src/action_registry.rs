use std::collections::HashMap;
use rust_openxr_bridge_api::{ActionPoseState, ActionState, ActionStateValue, ActionType, ActionValue, HostPose,
                             Pose, ReferenceSpaceType, XrError, XrResult};

/// Handler invoked with the action path and its current value.
pub type ActionCallback = Box<dyn FnMut(&str, ActionValue)>;

pub struct ActionBinding {
    pub path: String,
    pub action_type: ActionType,
    pub reference_space: ReferenceSpaceType,
    callback: Option<ActionCallback>,
}

impl ActionBinding {
    pub fn is_pose(&self) -> bool {
        self.action_type == ActionType::PoseInput
    }
}

/// Subscribed actions of one session.
///
/// Filled during setup and only read while the frame loop runs.
#[derive(Default)]
pub struct ActionRegistry {
    bindings: HashMap<String, ActionBinding>,
    // Paths delivered once per render frame
    pose_paths: Vec<String>,
}

impl ActionRegistry {
    pub fn new() -> ActionRegistry {
        ActionRegistry::default()
    }

    /// Resolves the type of an action and checks the callback rules.
    ///
    /// The type is inferred from the path when not given. Output actions
    /// take no callback; every input action requires one.
    pub fn resolve(path: &str, action_type: Option<ActionType>, has_callback: bool) -> XrResult<ActionType> {
        let action_type = match action_type {
            Some(action_type) => action_type,
            None => ActionType::from_path(path)?,
        };
        match (action_type.is_output(), has_callback) {
            (false, false) => Err(XrError::invalid(format!("the callback for {} was not defined", path))),
            (true, true) => Err(XrError::invalid(format!("{} is an output action and takes no callback", path))),
            _ => Ok(action_type),
        }
    }

    /// Records a subscription and returns the resolved action type.
    pub fn subscribe(&mut self,
                     path: &str,
                     action_type: Option<ActionType>,
                     callback: Option<ActionCallback>,
                     reference_space: ReferenceSpaceType) -> XrResult<ActionType> {
        let action_type = ActionRegistry::resolve(path, action_type, callback.is_some())?;

        if action_type == ActionType::PoseInput && !self.pose_paths.iter().any(|p| p == path) {
            self.pose_paths.push(path.to_owned());
        } else if action_type != ActionType::PoseInput {
            self.pose_paths.retain(|p| p != path);
        }
        self.bindings.insert(path.to_owned(), ActionBinding {
            path: path.to_owned(),
            action_type,
            reference_space,
            callback,
        });
        Ok(action_type)
    }

    pub fn binding(&self, path: &str) -> Option<&ActionBinding> {
        self.bindings.get(path)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn pose_len(&self) -> usize {
        self.pose_paths.len()
    }

    /// Delivers the input states of one poll cycle. Pose and output records
    /// are left to the render cycle.
    pub fn dispatch_inputs(&mut self, states: &[ActionState]) {
        for state in states {
            if !state.is_active {
                continue;
            }
            let value = match state.value {
                ActionStateValue::Boolean(b) => ActionValue::Boolean(b),
                ActionStateValue::Float(f) => ActionValue::Float(f),
                ActionStateValue::Vector2f([x, y]) => ActionValue::Vector2f(x, y),
                ActionStateValue::Pose(_) | ActionStateValue::Vibration => continue,
            };
            self.invoke(&state.path, value);
        }
    }

    /// Delivers the pose states of one render frame, mapped through `to_host`.
    pub fn dispatch_poses<F>(&mut self, states: &[ActionPoseState], mut to_host: F) -> XrResult<()>
        where F: FnMut(&Pose) -> XrResult<HostPose>
    {
        for state in states {
            if !state.is_active || !self.pose_paths.iter().any(|p| *p == state.path) {
                continue;
            }
            let pose = to_host(&state.pose)?;
            self.invoke(&state.path, ActionValue::Pose(pose));
        }
        Ok(())
    }

    fn invoke(&mut self, path: &str, value: ActionValue) {
        match self.bindings.get_mut(path).and_then(|b| b.callback.as_mut()) {
            Some(callback) => callback(path, value),
            None => debug!("No callback subscribed for action {}", path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use rust_openxr_bridge_api::Quat;

    type Log = Rc<RefCell<Vec<(String, ActionValue)>>>;

    fn recorder(log: &Log) -> Option<ActionCallback> {
        let log = log.clone();
        Some(Box::new(move |path: &str, value: ActionValue| log.borrow_mut().push((path.to_owned(), value))))
    }

    fn state(path: &str, value: ActionStateValue) -> ActionState {
        ActionState { path: path.into(), is_active: true, value }
    }

    #[test]
    fn infers_types_on_subscribe() {
        let log = Log::default();
        let mut registry = ActionRegistry::new();
        let local = ReferenceSpaceType::Local;
        assert_eq!(registry.subscribe("/user/hand/left/input/trigger/value", None, recorder(&log), local),
                   Ok(ActionType::FloatInput));
        assert_eq!(registry.subscribe("/user/hand/left/input/menu/click", None, recorder(&log), local),
                   Ok(ActionType::BooleanInput));
        assert_eq!(registry.subscribe("/user/hand/left/output/haptic", None, None, local),
                   Ok(ActionType::VibrationOutput));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.pose_len(), 0);
    }

    #[test]
    fn callback_rules() {
        let log = Log::default();
        let mut registry = ActionRegistry::new();
        let local = ReferenceSpaceType::Local;
        assert!(registry.subscribe("/user/hand/left/input/menu/click", None, None, local).is_err());
        assert!(registry.subscribe("/user/hand/left/output/haptic", None, recorder(&log), local).is_err());
        assert!(registry.subscribe("/user/hand/left/input/trigger", None, recorder(&log), local).is_err());
        assert!(registry.is_empty());
        // explicit type wins over the path
        assert_eq!(registry.subscribe("/custom/action", Some(ActionType::FloatInput), recorder(&log), local),
                   Ok(ActionType::FloatInput));
    }

    #[test]
    fn dispatches_active_inputs_only() {
        let log = Log::default();
        let mut registry = ActionRegistry::new();
        let local = ReferenceSpaceType::Local;
        registry.subscribe("/a/click", None, recorder(&log), local).unwrap();
        registry.subscribe("/a/value", None, recorder(&log), local).unwrap();
        registry.subscribe("/a/x", None, recorder(&log), local).unwrap();
        registry.subscribe("/a/pose", None, recorder(&log), local).unwrap();
        registry.subscribe("/a/haptic", None, None, local).unwrap();

        let mut inactive = state("/a/value", ActionStateValue::Float(0.1));
        inactive.is_active = false;
        registry.dispatch_inputs(&[
            state("/a/click", ActionStateValue::Boolean(true)),
            inactive,
            state("/a/x", ActionStateValue::Vector2f([0.5, -0.5])),
            state("/a/pose", ActionStateValue::Pose(Pose::default())),
            state("/a/haptic", ActionStateValue::Vibration),
            state("/a/value", ActionStateValue::Float(0.75)),
        ]);

        assert_eq!(*log.borrow(), vec![
            ("/a/click".to_owned(), ActionValue::Boolean(true)),
            ("/a/x".to_owned(), ActionValue::Vector2f(0.5, -0.5)),
            ("/a/value".to_owned(), ActionValue::Float(0.75)),
        ]);
    }

    #[test]
    fn dispatches_converted_poses() {
        let log = Log::default();
        let mut registry = ActionRegistry::new();
        registry.subscribe("/user/hand/left/input/grip/pose", None, recorder(&log), ReferenceSpaceType::Stage).unwrap();
        assert_eq!(registry.pose_len(), 1);

        let pose = Pose { position: [1.0, 2.0, 3.0], orientation: [0.0, 0.0, 0.0, 1.0] };
        let states = vec![
            ActionPoseState { path: "/user/hand/left/input/grip/pose".into(), is_active: true, pose },
            ActionPoseState { path: "/user/hand/right/input/grip/pose".into(), is_active: true, pose },
            ActionPoseState { path: "/user/hand/left/input/grip/pose".into(), is_active: false, pose },
        ];
        registry.dispatch_poses(&states, |p| crate::pose::convert(p, 1.0)).unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1, ActionValue::Pose(HostPose { position: [1.0, -3.0, 2.0], orientation: Quat::IDENTITY }));
    }
}
