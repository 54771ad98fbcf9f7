use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{DefaultTerminal, Frame};

use crate::config::SoundConfig;
use crate::protocol::Action;
use crate::sync::{Completion, Outcome, Request, StateSync};

use super::chime::{Chime, Cue};
use super::event::{AppEvent, EventSource};
use super::keymap::{Intent, KeyMap, ModeContext};
use super::theme::ThemeEngine;
use super::ui;
use super::view::{self, Screen};

/// Plays one chime.
pub type PlayFn = Box<dyn FnMut() + Send>;

pub struct App {
    pub keymap: KeyMap,
    pub sync: StateSync,
    pub themes: ThemeEngine,
    pub should_quit: bool,
    chime: Chime,
    play: PlayFn,
}

impl App {
    pub fn new(sync: StateSync, themes: ThemeEngine, sound: SoundConfig) -> Self {
        Self::with_player(sync, themes, Box::new(move || sound.play()))
    }

    pub fn with_player(sync: StateSync, themes: ThemeEngine, play: PlayFn) -> Self {
        App {
            keymap: KeyMap::default_keymap(),
            sync,
            themes,
            should_quit: false,
            chime: Chime::new(),
            play,
        }
    }

    pub async fn run(
        &mut self,
        terminal: &mut DefaultTerminal,
        events: &mut EventSource,
    ) -> Result<()> {
        self.sync.initial();

        loop {
            terminal.draw(|frame| self.draw(frame))?;

            match events.next().await? {
                AppEvent::Key(key) => self.handle_key(&key),
                AppEvent::Tick => self.on_tick(),
                AppEvent::Synced(completion) => self.on_completion(completion),
                AppEvent::Resize => {}
                AppEvent::InputClosed => self.should_quit = true,
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    pub fn draw(&self, frame: &mut Frame) {
        let screen = self.screen();
        ui::draw(frame, screen.as_ref(), self.sync.link(), self.themes.palette());
    }

    /// The frame as it would be drawn now, or `None` before the first
    /// snapshot.
    pub fn screen(&self) -> Option<Screen> {
        self.sync
            .snapshot()
            .map(|snapshot| view::project(snapshot, &self.themes, &self.keymap, self.sync.link()))
    }

    pub fn mode_context(&self) -> ModeContext {
        ModeContext {
            overlay_open: self.themes.is_open(),
            mode: self.sync.snapshot().map(|s| s.input_mode),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) {
        let Some(intent) = self.keymap.dispatch(self.mode_context(), key) else {
            return;
        };
        match intent {
            Intent::Backend(action) => {
                let seq = self.sync.send(action);
                tracing::debug!(seq, %action, "sent action");
            }
            Intent::OpenThemes => self.themes.open(),
            Intent::Theme(command) => self.themes.handle(command),
            Intent::Quit => self.should_quit = true,
        }
    }

    pub fn on_tick(&mut self) {
        self.sync.poll();
    }

    pub fn on_completion(&mut self, completion: Completion) {
        let seq = completion.seq;
        let ack_result = (completion.request == Request::Send(Action::ClearSound))
            .then(|| completion.result.is_ok());

        let outcome = self.sync.apply(completion);

        // Settle the ack even when its response lost the race to a newer one.
        let issued = self.sync.last_issued();
        match ack_result {
            Some(true) => self.chime.ack_confirmed(seq, issued),
            Some(false) => self.chime.ack_failed(seq),
            None => {}
        }

        if !matches!(outcome, Outcome::Applied) {
            return;
        }
        let pending = self.sync.snapshot().is_some_and(|s| s.sound_pending);
        match self.chime.observe(seq, pending, issued) {
            Cue::Ring => {
                (self.play)();
                self.acknowledge();
            }
            Cue::Acknowledge => self.acknowledge(),
            Cue::Nothing => {}
        }
    }

    fn acknowledge(&mut self) {
        let seq = self.sync.send(Action::ClearSound);
        self.chime.acknowledging(seq);
    }
}
