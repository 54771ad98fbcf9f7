pub mod app;
pub mod chime;
pub mod event;
pub mod gradient_bar;
pub mod keymap;
pub mod theme;
pub mod ui;
pub mod view;

use std::sync::Arc;

use anyhow::Result;

use crate::backend::Backend;
use crate::config::{Config, Prefs};
use crate::sync::StateSync;

use self::app::App;
use self::event::EventSource;
use self::theme::ThemeEngine;

/// Run the interface against `backend` until the user quits.
pub async fn run(backend: Arc<dyn Backend>, config: &Config, prefs: Option<Prefs>) -> Result<()> {
    let (sync, completions) = StateSync::new(backend, &config.sync);
    let themes = ThemeEngine::new(config.theme.clone(), prefs);
    let mut app = App::new(sync, themes, config.sound.clone());
    let mut events = EventSource::new(config.sync.tick(), completions);

    let mut terminal = ratatui::init();
    tracing::info!(theme = app.themes.active_preset().id, "interface started");
    let result = app.run(&mut terminal, &mut events).await;
    ratatui::restore();
    tracing::info!("interface stopped");
    result
}
