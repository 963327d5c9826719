use std::sync::{Arc, Mutex};

use param_loader::observer::ResolutionObserver;
use param_loader::{Accessor, Outcome, ResolutionError};

/// Keeps track of the identifiers an accessor was invoked with.
#[derive(Clone, Default)]
pub struct CallTracker(Arc<Mutex<Vec<String>>>);

impl CallTracker {
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn assert_called_once_with(&self, identifier: &str) {
        assert_eq!(self.calls(), vec![identifier.to_owned()]);
    }
}

/// An accessor that returns whatever `f` returns, while keeping track
/// of how it was invoked.
pub fn spy_accessor<C, T, F, R>(f: F) -> (Accessor<C, T>, CallTracker)
where
    C: 'static,
    T: 'static,
    F: Fn(&str, &C) -> R + Send + Sync + 'static,
    R: Into<Outcome<T>>,
{
    let tracker = CallTracker::default();
    let calls = tracker.clone();
    let accessor = Accessor::from_fn(move |identifier: &str, ctx: &C| {
        calls.0.lock().unwrap().push(identifier.to_owned());
        f(identifier, ctx)
    });
    (accessor, tracker)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created,
    Loaded {
        name: String,
        identifier: String,
    },
    Failed {
        name: String,
        identifier: String,
        error: ResolutionError,
        raised: bool,
    },
}

/// An observer that records every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingObserver(Arc<Mutex<Vec<Event>>>);

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

impl ResolutionObserver for RecordingObserver {
    fn on_created(&self) {
        self.0.lock().unwrap().push(Event::Created);
    }

    fn on_loaded(&self, name: &str, identifier: &str) {
        self.0.lock().unwrap().push(Event::Loaded {
            name: name.to_owned(),
            identifier: identifier.to_owned(),
        });
    }

    fn on_failed(&self, name: &str, identifier: &str, error: &ResolutionError, raised: bool) {
        self.0.lock().unwrap().push(Event::Failed {
            name: name.to_owned(),
            identifier: identifier.to_owned(),
            error: error.clone(),
            raised,
        });
    }
}
