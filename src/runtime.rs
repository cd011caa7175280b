// Event loop
//
// One thread owns the ChatSession and its surface. Remote calls and delays
// run on short-lived worker threads and report back over the same channel
// that carries terminal input, so session state is only touched here.

use crate::commands::{is_confirmation, parse_command, Command, HELP_TEXT};
use crate::correction::{ClientError, CorrectionService};
use crate::language::Language;
use crate::session::{ChatSession, Effect, Event};
use crate::terminal::Console;
use std::io::BufRead;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info};

pub enum Inbound {
    Line(String),
    InputClosed,
    Core(Event),
}

pub struct Runtime<S: Console> {
    session: ChatSession,
    surface: S,
    service: Arc<dyn CorrectionService>,
    tx: Sender<Inbound>,
    rx: Receiver<Inbound>,
    awaiting_clear_confirmation: bool,
    outstanding: usize,
    input_closed: bool,
}

impl<S: Console> Runtime<S> {
    pub fn new(session: ChatSession, surface: S, service: Arc<dyn CorrectionService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            session,
            surface,
            service,
            tx,
            rx,
            awaiting_clear_confirmation: false,
            outstanding: 0,
            input_closed: false,
        }
    }

    /// Handle for feeding input lines into the loop.
    pub fn sender(&self) -> Sender<Inbound> {
        self.tx.clone()
    }

    /// Run until `/quit`, or until input is closed and nothing is in flight.
    /// Returns the session and surface for inspection.
    pub fn run(mut self) -> (ChatSession, S) {
        self.session.start(&mut self.surface);
        info!("Ready (default language {})", self.session.default_language());

        loop {
            if self.input_closed && self.outstanding == 0 {
                break;
            }
            let Ok(message) = self.rx.recv() else {
                break;
            };
            match message {
                Inbound::Line(line) => {
                    if !self.on_line(&line) {
                        break;
                    }
                }
                Inbound::InputClosed => {
                    debug!("Input closed with {} request(s) in flight", self.outstanding);
                    self.input_closed = true;
                }
                Inbound::Core(event) => {
                    self.outstanding = self.outstanding.saturating_sub(1);
                    self.dispatch(event);
                }
            }
        }

        info!(
            "Shutting down after {} turn(s)",
            self.session.turns().completed_turns()
        );
        (self.session, self.surface)
    }

    /// Returns false when the user asked to quit.
    fn on_line(&mut self, line: &str) -> bool {
        if self.awaiting_clear_confirmation {
            self.awaiting_clear_confirmation = false;
            self.dispatch(Event::ClearHistory {
                confirmed: is_confirmation(line),
            });
            return true;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                self.surface.notice(&message);
                return true;
            }
        };

        match command {
            Command::Submit(text) => self.dispatch(Event::Submit(text)),
            Command::ShowHistory => {
                let entries = self.session.history().entries().to_vec();
                self.surface.history_changed(&entries);
            }
            Command::Pick(index) => self.dispatch(Event::PickHistory(index)),
            Command::Clear => {
                self.awaiting_clear_confirmation = true;
                self.surface
                    .notice("Are you sure you want to clear all search history? [y/N]");
            }
            Command::Language(code) => {
                let line = if Language::from_code(&code).is_none() {
                    format!("Unknown language: {} (use en, es, fr, de or bn)", code)
                } else {
                    self.dispatch(Event::SelectDefaultLanguage(code));
                    format!("New sentences explained in {}", self.session.default_language())
                };
                self.surface.notice(&line);
            }
            Command::Explain { message, language } => {
                self.dispatch(Event::ChangeExplanationLanguage { message, language })
            }
            Command::Action(subscription) => self.dispatch(Event::TriggerAction(subscription)),
            Command::Help => self.surface.notice(HELP_TEXT),
            Command::Quit => return false,
        }
        true
    }

    fn dispatch(&mut self, event: Event) {
        if let Some(effect) = self.session.handle(event, &mut self.surface) {
            self.spawn_effect(effect);
        }
    }

    fn spawn_effect(&mut self, effect: Effect) {
        self.outstanding += 1;
        let tx = self.tx.clone();
        match effect {
            Effect::Fetch { request, flight } => {
                let service = Arc::clone(&self.service);
                debug!("Spawning fetch ({} chars, {})", request.text.chars().count(), request.language);
                thread::spawn(move || {
                    // A panicking service must still settle the turn.
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| service.fetch(&request)))
                        .unwrap_or_else(|_| {
                            error!("Correction worker panicked");
                            Err(ClientError::Transport("correction worker panicked".to_string()))
                        });
                    let _ = tx.send(Inbound::Core(Event::CorrectionSettled { flight, outcome }));
                });
            }
            Effect::Delay { duration, turn } => {
                debug!("Spawning {:?} delay", duration);
                thread::spawn(move || {
                    thread::sleep(duration);
                    let _ = tx.send(Inbound::Core(Event::DelayElapsed(turn)));
                });
            }
        }
    }
}

/// Forward stdin lines to the loop; sends `InputClosed` at EOF.
pub fn spawn_stdin_reader(tx: Sender<Inbound>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Inbound::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(Inbound::InputClosed);
    });
}
