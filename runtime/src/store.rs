use crate::RuntimeError;
use charla_common::*;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies one player session towards its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl SessionId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SessionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owner of the dialog graphs and performer of their side effects.
///
/// Every method takes `&self` so one store can back several sessions.
/// Side effects are fire and forget.
pub trait DialogStore {
    fn get_dialog(&self, name: &str) -> Result<Arc<DialogGraph>, RuntimeError>;
    fn trigger_sound(&self, name: &str, target: &str);
    fn trigger_animation(&self, name: &str);
    fn dispatch_event(&self, name: &str);
    /// Called once when a session falls through its last state.
    fn on_end(&self, session: SessionId);
}

impl<T> DialogStore for Arc<T>
where
    T: DialogStore + ?Sized,
{
    fn get_dialog(&self, name: &str) -> Result<Arc<DialogGraph>, RuntimeError> {
        (**self).get_dialog(name)
    }
    fn trigger_sound(&self, name: &str, target: &str) {
        (**self).trigger_sound(name, target)
    }
    fn trigger_animation(&self, name: &str) {
        (**self).trigger_animation(name)
    }
    fn dispatch_event(&self, name: &str) {
        (**self).dispatch_event(name)
    }
    fn on_end(&self, session: SessionId) {
        (**self).on_end(session)
    }
}

impl<T> DialogStore for &T
where
    T: DialogStore + ?Sized,
{
    fn get_dialog(&self, name: &str) -> Result<Arc<DialogGraph>, RuntimeError> {
        (**self).get_dialog(name)
    }
    fn trigger_sound(&self, name: &str, target: &str) {
        (**self).trigger_sound(name, target)
    }
    fn trigger_animation(&self, name: &str) {
        (**self).trigger_animation(name)
    }
    fn dispatch_event(&self, name: &str) {
        (**self).dispatch_event(name)
    }
    fn on_end(&self, session: SessionId) {
        (**self).on_end(session)
    }
}

/// Side effect requested from a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Sound { name: String, target: String },
    Animation(String),
    Event(String),
    End(SessionId),
}

/// In-memory corpus that records the side effects it is asked to perform.
#[derive(Debug, Default)]
pub struct MemoryStore {
    dialogs: HashMap<DialogName, Arc<DialogGraph>>,
    effects: Mutex<Vec<Effect>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_corpus(corpus: DialogCorpus) -> Self {
        let mut store = Self::new();
        for (name, graph) in corpus {
            store.insert(name, graph);
        }
        store
    }

    pub fn with_dialog<N>(mut self, name: N, graph: DialogGraph) -> Self
    where
        N: Into<DialogName>,
    {
        self.insert(name, graph);
        self
    }

    pub fn insert<N>(&mut self, name: N, graph: DialogGraph) -> Option<Arc<DialogGraph>>
    where
        N: Into<DialogName>,
    {
        self.dialogs.insert(name.into(), Arc::new(graph))
    }

    /// Effects recorded so far, leaving the log empty.
    pub fn take_effects(&self) -> Vec<Effect> {
        let mut effects = self.effects.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *effects)
    }

    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, effect: Effect) {
        tracing::debug!(?effect, "store effect");
        self.effects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(effect);
    }
}

impl DialogStore for MemoryStore {
    fn get_dialog(&self, name: &str) -> Result<Arc<DialogGraph>, RuntimeError> {
        self.dialogs
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::DialogNotFound {
                name: name.to_string(),
            })
    }

    fn trigger_sound(&self, name: &str, target: &str) {
        self.record(Effect::Sound {
            name: name.to_string(),
            target: target.to_string(),
        });
    }

    fn trigger_animation(&self, name: &str) {
        self.record(Effect::Animation(name.to_string()));
    }

    fn dispatch_event(&self, name: &str) {
        self.record(Effect::Event(name.to_string()));
    }

    fn on_end(&self, session: SessionId) {
        self.record(Effect::End(session));
    }
}
