use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::sync::Completion;

pub enum AppEvent {
    Key(KeyEvent),
    /// Terminal was resized; redraw only.
    Resize,
    /// Time to poll the backend.
    Tick,
    Synced(Completion),
    /// The terminal input stream ended.
    InputClosed,
}

/// Merges terminal input, the poll ticker and backend completions into a
/// single stream the UI loop can await.
pub struct EventSource {
    tick: Interval,
    input: EventStream,
    completions: mpsc::UnboundedReceiver<Completion>,
}

impl EventSource {
    pub fn new(tick_rate: Duration, completions: mpsc::UnboundedReceiver<Completion>) -> Self {
        let mut tick = tokio::time::interval(tick_rate);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        EventSource {
            tick,
            input: EventStream::new(),
            completions,
        }
    }

    pub async fn next(&mut self) -> Result<AppEvent> {
        loop {
            tokio::select! {
                Some(completion) = self.completions.recv() => {
                    return Ok(AppEvent::Synced(completion));
                }
                maybe_event = self.input.next() => match maybe_event {
                    Some(Ok(Event::Key(key))) => return Ok(AppEvent::Key(key)),
                    Some(Ok(Event::Resize(..))) => return Ok(AppEvent::Resize),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(AppEvent::InputClosed),
                },
                _ = self.tick.tick() => return Ok(AppEvent::Tick),
            }
        }
    }
}
