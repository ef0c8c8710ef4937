use charla_parser::ParseWarning;
use charla_runtime::*;
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;

/// Upper bound on the ticks taken by a single fast-forward.
const MAX_FAST_FORWARD_TICKS: usize = 100_000;

/// Lines produced by the player and its store since the last render.
type Transcript = Rc<RefCell<Vec<String>>>;

/// One scripted input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Tick by the given seconds, or by the console's tick.
    Tick(Option<f32>),
    FastForward,
    /// 1-based response number.
    Choose(usize),
    Advance,
    Pause,
    Resume,
    Stop,
    Play,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "t" => Ok(Command::Tick(None)),
            "f" => Ok(Command::FastForward),
            "a" => Ok(Command::Advance),
            "p" => Ok(Command::Pause),
            "r" => Ok(Command::Resume),
            "x" => Ok(Command::Stop),
            "play" => Ok(Command::Play),
            "q" => Ok(Command::Quit),
            _ => {
                if let Some(seconds) = input.strip_prefix('t') {
                    return seconds
                        .parse::<f32>()
                        .map(|seconds| Command::Tick(Some(seconds)))
                        .map_err(|_| format!("Invalid tick: {}", input));
                }
                match input.parse::<usize>() {
                    Ok(choice) if choice > 0 => Ok(Command::Choose(choice)),
                    Ok(_) => Err(format!("Invalid option: {}", input)),
                    Err(_) => Err(format!("Unknown command: {}", input)),
                }
            }
        }
    }
}

/// Serves the corpus and writes every side effect to the transcript.
pub struct ConsoleStore {
    dialogs: MemoryStore,
    transcript: Transcript,
}

impl ConsoleStore {
    fn write(&self, line: String) {
        self.transcript.borrow_mut().push(line);
    }
}

impl DialogStore for ConsoleStore {
    fn get_dialog(&self, name: &str) -> Result<Arc<DialogGraph>, RuntimeError> {
        self.dialogs.get_dialog(name)
    }

    fn trigger_sound(&self, name: &str, _target: &str) {
        self.write(format!("SOUND {}", name));
    }

    fn trigger_animation(&self, name: &str) {
        self.write(format!("ANIMATION {}", name));
    }

    fn dispatch_event(&self, name: &str) {
        self.write(format!("EVENT {}", name));
    }

    fn on_end(&self, _session: SessionId) {
        self.write("END".to_string());
    }
}

/// Drives a player from scripted inputs and prints what a host would show.
pub struct Console {
    player: Player<ConsoleStore>,
    dialog: DialogName,
    tick: f32,
    transcript: Transcript,
    shown_text: String,
}

impl Console {
    pub fn new(corpus: DialogCorpus, dialog: DialogName, config: PlayerConfig, tick: f32) -> Self {
        let transcript = Transcript::default();
        let store = ConsoleStore {
            dialogs: MemoryStore::from_corpus(corpus),
            transcript: Rc::clone(&transcript),
        };

        let mut player = Player::new(store, config);
        let responses = Rc::clone(&transcript);
        player.subscribe(move |notification: &Notification| {
            if let Notification::ResponsesReady(texts) = notification {
                let mut lines = responses.borrow_mut();
                for (i, text) in texts.iter().enumerate() {
                    lines.push(format!("  {}. {}", i + 1, text));
                }
            }
        });

        let shown_text = player.revealed_text().to_string();
        Console {
            player,
            dialog,
            tick,
            transcript,
            shown_text,
        }
    }

    pub fn player(&self) -> &Player<ConsoleStore> {
        &self.player
    }

    /// Plays the dialog and feeds it the comma separated `inputs`, stopping at `q`.
    pub fn run<W: Write>(&mut self, inputs: &str, out: &mut W) -> io::Result<()> {
        self.start(out)?;

        for input in inputs.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let command = match input.parse::<Command>() {
                Ok(command) => command,
                Err(message) => {
                    writeln!(out, "ERROR: {}", message)?;
                    continue;
                }
            };
            tracing::debug!(?command, "console input");

            match command {
                Command::Quit => {
                    writeln!(out, "QUIT")?;
                    break;
                }
                Command::Play => self.start(out)?,
                command => {
                    let result = self.execute(command);
                    self.render(out)?;
                    if let Err(err) = result {
                        writeln!(out, "{}", err)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn start<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let was_idle = self.player.is_idle();
        match self.player.play(&self.dialog) {
            Ok(()) if was_idle => writeln!(out, "START")?,
            Ok(()) => {}
            Err(err) => writeln!(out, "{}", err)?,
        }
        self.render(out)
    }

    fn execute(&mut self, command: Command) -> Result<(), RuntimeError> {
        match command {
            Command::Tick(seconds) => self.player.update(seconds.unwrap_or(self.tick)),
            Command::FastForward => self.fast_forward(),
            Command::Choose(choice) => self.player.advance(Some(choice - 1)),
            Command::Advance => self.player.advance(None),
            Command::Pause => {
                self.player.pause();
                Ok(())
            }
            Command::Resume => {
                self.player.resume();
                Ok(())
            }
            Command::Stop => {
                self.player.stop();
                Ok(())
            }
            Command::Play | Command::Quit => Ok(()),
        }
    }

    /// Ticks until the text is fully revealed or nothing is left to reveal.
    fn fast_forward(&mut self) -> Result<(), RuntimeError> {
        for _ in 0..MAX_FAST_FORWARD_TICKS {
            if self.player.is_idle()
                || self.player.is_paused()
                || self.player.is_waiting_for_response()
            {
                break;
            }
            self.player.update(self.tick)?;
        }
        Ok(())
    }

    fn render<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let text = self.player.revealed_text();
        if text != self.shown_text {
            self.shown_text = text.to_string();
            if text != self.player.config().dialog_prefix {
                writeln!(out, "{}", text)?;
            }
        }

        for line in self.transcript.borrow_mut().drain(..) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

pub fn write_warnings<W: Write>(
    file_name: &str,
    warnings: &[ParseWarning],
    out: &mut W,
) -> io::Result<()> {
    for warning in warnings {
        writeln!(out, "{}: WARNING: {}", file_name, warning)?;
    }
    Ok(())
}
