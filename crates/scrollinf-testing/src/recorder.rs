use std::cell::RefCell;
use std::rc::Rc;

use scrollinf_core::{EngineCallbacks, LoadError, LoadingState};

/// Captures state-change and error notifications.
#[derive(Clone, Default)]
pub struct Recorder {
    states: Rc<RefCell<Vec<LoadingState>>>,
    errors: Rc<RefCell<Vec<LoadError>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the recording notifications to `callbacks`.
    pub fn wire(&self, callbacks: EngineCallbacks) -> EngineCallbacks {
        let states = Rc::clone(&self.states);
        let errors = Rc::clone(&self.errors);
        callbacks
            .on_state_change(move |state| states.borrow_mut().push(state))
            .on_error(move |error| errors.borrow_mut().push(error.clone()))
    }

    pub fn states(&self) -> Vec<LoadingState> {
        self.states.borrow().clone()
    }

    pub fn errors(&self) -> Vec<LoadError> {
        self.errors.borrow().clone()
    }

    pub fn clear(&self) {
        self.states.borrow_mut().clear();
        self.errors.borrow_mut().clear();
    }
}
