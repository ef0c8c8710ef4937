use charla_common::*;
use std::sync::Arc;

/// Where a session is in its dialog.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// A graph is loaded; the next update binds its entry state.
    Starting,
    /// Index of the bound state in graph order.
    InState(usize),
}

/// Mutable runtime state of one player.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerSession {
    pub dialog: Option<DialogName>,
    pub graph: Option<Arc<DialogGraph>>,
    pub phase: Phase,
    /// Index, in chars, of the next character to process.
    pub read_cursor: usize,
    pub revealed_text: String,
    pub timer: f32,
    pub paused: bool,
    pub char_sound_counter: u32,
    pub responses_shown: bool,
}

impl PlayerSession {
    pub fn new(prefix: &str, sound_cadence: u32) -> Self {
        Self {
            revealed_text: prefix.to_string(),
            char_sound_counter: sound_cadence,
            ..Default::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn current_state(&self) -> Option<(&str, &DialogState)> {
        match self.phase {
            Phase::InState(index) => self.graph.as_ref()?.state_at(index),
            _ => None,
        }
    }

    /// Clears everything tied to the bound state; graph and phase stay.
    pub(crate) fn reset_state_fields(&mut self, prefix: &str, sound_cadence: u32) {
        self.read_cursor = 0;
        self.revealed_text.clear();
        self.revealed_text.push_str(prefix);
        self.timer = 0.0;
        self.paused = false;
        self.char_sound_counter = sound_cadence;
        self.responses_shown = false;
    }
}
