use crate::{
    AdvanceError, DialogStore, Notification, Phase, PlayerListener, PlayerSession, RuntimeError,
    SessionId,
};
use charla_common::*;
use charla_parser::tag::{self, Tag, TAG_OPEN};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::sync::Arc;

/// Character that consumes `blank_delay` without being displayed.
pub const BLANK: char = '_';

/// Plays one dialog at a time, driven by `update` calls from the host.
pub struct Player<S> {
    id: SessionId,
    store: S,
    config: PlayerConfig,
    session: PlayerSession,
    text: Vec<char>,
    displayed: String,
    rng: Pcg32,
    listeners: Vec<Box<dyn PlayerListener>>,
}

impl<S> Player<S>
where
    S: DialogStore,
{
    pub fn new(store: S, config: PlayerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => Pcg32::seed_from_u64(seed),
            None => Pcg32::from_entropy(),
        };
        let session = PlayerSession::new(&config.dialog_prefix, config.sound_cadence());

        Self {
            id: SessionId::next(),
            store,
            displayed: session.revealed_text.clone(),
            session,
            config,
            text: Vec::new(),
            rng,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    pub fn subscribe<L>(&mut self, listener: L)
    where
        L: PlayerListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn dialog_name(&self) -> Option<&str> {
        self.session.dialog.as_deref()
    }

    pub fn current_state_name(&self) -> Option<&str> {
        self.session.current_state().map(|(name, _)| name)
    }

    pub fn current_state(&self) -> Option<&DialogState> {
        self.session.current_state().map(|(_, state)| state)
    }

    /// Displayed text: the prefix followed by every revealed character.
    pub fn revealed_text(&self) -> &str {
        &self.session.revealed_text
    }

    pub fn read_cursor(&self) -> usize {
        self.session.read_cursor
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_idle()
    }

    pub fn is_paused(&self) -> bool {
        self.session.paused
    }

    pub fn is_waiting_for_response(&self) -> bool {
        matches!(self.session.phase, Phase::InState(_)) && self.session.read_cursor >= self.text.len()
    }

    /// Loads `name` from the store. The entry state is bound by the next
    /// `update`. Does nothing while a state is bound.
    pub fn play(&mut self, name: &str) -> Result<(), RuntimeError> {
        if matches!(self.session.phase, Phase::InState(_)) {
            return Ok(());
        }

        self.reset();

        let graph = self.store.get_dialog(name).map_err(|err| self.fail(err))?;
        if !graph.contains(ENTRY_STATE) {
            return Err(self.fail(RuntimeError::StateNotFound {
                name: ENTRY_STATE.to_string(),
            }));
        }

        tracing::info!(session = %self.id, dialog = name, "dialog started");
        self.session.dialog = Some(name.to_string());
        self.session.graph = Some(graph);
        self.session.phase = Phase::Starting;
        self.refresh_text();
        Ok(())
    }

    pub fn stop(&mut self) {
        if !self.session.is_idle() {
            tracing::info!(session = %self.id, "dialog stopped");
        }
        self.reset();
        self.refresh_text();
    }

    /// Hides responses and drops the revealed text. Reveal starts over from
    /// the first character once resumed.
    pub fn pause(&mut self) {
        if self.session.paused {
            return;
        }

        self.hide_responses();
        self.session.paused = true;
        self.session.read_cursor = 0;
        self.session.revealed_text.clear();
        self.session.revealed_text.push_str(&self.config.dialog_prefix);
        self.refresh_text();
    }

    pub fn resume(&mut self) {
        self.session.paused = false;
    }

    /// Advances the reveal by `delta` seconds.
    pub fn update(&mut self, delta: f32) -> Result<(), RuntimeError> {
        if self.session.is_idle() || self.session.paused {
            return Ok(());
        }

        if self.session.phase == Phase::Starting {
            let graph = self.graph()?;
            let index = graph.position(ENTRY_STATE).ok_or_else(|| {
                self.fail(RuntimeError::StateNotFound {
                    name: ENTRY_STATE.to_string(),
                })
            })?;
            self.enter_state(&graph, index);
        }

        let result = self.reveal(delta.max(0.0));
        self.refresh_text();
        result
    }

    /// Moves to the next state. `choice` picks a response on branch points;
    /// `None` follows the state's jump or falls through to the next state in
    /// graph order.
    pub fn advance(&mut self, choice: Option<usize>) -> Result<(), RuntimeError> {
        if self.session.paused {
            tracing::warn!(session = %self.id, "Cannot advance a paused dialog!");
            return Err(AdvanceError::Paused.into());
        }
        let index = match self.session.phase {
            Phase::InState(index) => index,
            _ => return Err(AdvanceError::NotPlaying.into()),
        };

        self.hide_responses();

        let graph = self.graph()?;
        let (_, state) = graph
            .state_at(index)
            .ok_or(RuntimeError::from(AdvanceError::NotPlaying))?;

        let jump = if state.has_responses() {
            let Some(choice) = choice else {
                return Err(self.fail(AdvanceError::ResponseRequired.into()));
            };
            let response = state.responses.get(choice).ok_or_else(|| {
                self.fail(
                    AdvanceError::ResponseOutOfRange {
                        index: choice,
                        available: state.responses.len(),
                    }
                    .into(),
                )
            })?;
            let target = response.jump.as_deref().ok_or_else(|| {
                self.fail(AdvanceError::ResponseWithoutJump { index: choice }.into())
            })?;
            Some(target)
        } else {
            state.jump.as_deref()
        };

        match jump {
            Some(target) => {
                let next = graph.position(target).ok_or_else(|| {
                    self.fail(RuntimeError::StateNotFound {
                        name: target.to_string(),
                    })
                })?;
                self.enter_state(&graph, next);
            }
            None if index + 1 < graph.len() => self.enter_state(&graph, index + 1),
            None => self.finish(),
        }

        self.refresh_text();
        Ok(())
    }

    fn reveal(&mut self, delta: f32) -> Result<(), RuntimeError> {
        let len = self.text.len();
        let cursor = self.session.read_cursor;

        if cursor < len {
            let character = self.text[cursor];

            if character == TAG_OPEN {
                let (tag, next) = tag::scan(&self.text, cursor).map_err(|source| {
                    self.fail(RuntimeError::MalformedTag {
                        state: self.current_state_name().unwrap_or_default().to_string(),
                        source,
                    })
                })?;
                self.trigger(&tag);
                self.session.read_cursor = next;
                if next >= len {
                    self.setup_responses();
                }
                return Ok(());
            }

            let blank = character == BLANK;
            let delay = if blank {
                self.config.blank_delay
            } else {
                self.config.char_delay
            };

            self.session.timer += delta;
            if self.session.timer < delay {
                return Ok(());
            }
            self.session.timer -= delay;

            if !blank {
                self.session.revealed_text.push(character);
                self.character_printed(character);
            }
            self.session.read_cursor += 1;

            if self.session.read_cursor >= len {
                self.setup_responses();
            }
            return Ok(());
        }

        if !self.session.responses_shown {
            self.setup_responses();
        }

        // A branch point waits for a choice; its auto-advance is ignored.
        let auto_advance = self
            .current_state()
            .filter(|state| !state.has_responses())
            .and_then(DialogState::auto_advance);
        if let Some(after) = auto_advance {
            self.session.timer += delta;
            if self.session.timer < after {
                return Ok(());
            }
            self.session.timer -= after;
            self.advance(None)?;
        }

        Ok(())
    }

    fn trigger(&self, tag: &Tag) {
        tracing::debug!(session = %self.id, %tag, "inline tag");
        match tag {
            Tag::Sound(name) => self.store.trigger_sound(name, &self.config.audio_target),
            Tag::Animation(name) => self.store.trigger_animation(name),
            Tag::Event(name) => self.store.dispatch_event(name),
        }
    }

    fn character_printed(&mut self, character: char) {
        self.notify(Notification::CharacterPrinted(character));

        if self.config.char_sounds.is_empty() {
            return;
        }
        self.session.char_sound_counter = self.session.char_sound_counter.saturating_sub(1);
        if self.session.char_sound_counter > 0 {
            return;
        }

        let index = self.rng.gen_range(0..self.config.char_sounds.len());
        self.store
            .trigger_sound(&self.config.char_sounds[index], &self.config.audio_target);
        self.session.char_sound_counter = self.config.sound_cadence();
    }

    fn setup_responses(&mut self) {
        let mut texts: Vec<String> = match self.current_state() {
            Some(state) if state.has_responses() => {
                state.responses.iter().map(|r| r.text.clone()).collect()
            }
            _ => return,
        };

        let slots = self.config.response_slots;
        if texts.len() > slots {
            let mismatch = RuntimeError::ConfigurationMismatch {
                state: self.current_state_name().unwrap_or_default().to_string(),
                responses: texts.len(),
                slots,
            };
            tracing::warn!(session = %self.id, "{}", mismatch);
            texts.truncate(slots);
        }

        self.session.responses_shown = true;
        self.notify(Notification::ResponsesReady(texts));
    }

    fn hide_responses(&mut self) {
        self.session.responses_shown = false;
        self.notify(Notification::ResponsesHidden);
    }

    fn enter_state(&mut self, graph: &DialogGraph, index: usize) {
        let Some((name, state)) = graph.state_at(index) else {
            return;
        };

        self.session
            .reset_state_fields(&self.config.dialog_prefix, self.config.sound_cadence());
        self.session.phase = Phase::InState(index);
        self.text = state.text.chars().collect();
        tracing::debug!(session = %self.id, state = name, "entered state");

        if let Some(event) = &state.event {
            self.store.dispatch_event(event);
        }
    }

    fn finish(&mut self) {
        tracing::info!(
            session = %self.id,
            dialog = self.dialog_name().unwrap_or_default(),
            "dialog finished"
        );
        self.reset();
        self.store.on_end(self.id);
    }

    fn reset(&mut self) {
        self.session = PlayerSession::new(&self.config.dialog_prefix, self.config.sound_cadence());
        self.text.clear();
    }

    fn graph(&self) -> Result<Arc<DialogGraph>, RuntimeError> {
        self.session
            .graph
            .clone()
            .ok_or(RuntimeError::from(AdvanceError::NotPlaying))
    }

    fn refresh_text(&mut self) {
        if self.displayed != self.session.revealed_text {
            self.displayed = self.session.revealed_text.clone();
            self.notify(Notification::TextChanged(self.displayed.clone()));
        }
    }

    fn notify(&mut self, notification: Notification) {
        for listener in self.listeners.iter_mut() {
            listener.notify(&notification);
        }
    }

    fn fail(&self, err: RuntimeError) -> RuntimeError {
        tracing::error!(session = %self.id, "{}", err);
        err
    }
}
