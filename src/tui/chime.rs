//! Plays the completion chime once per occurrence.
//!
//! The backend raises `sound_pending` and keeps it raised until the client
//! sends `clear_sound`. Snapshots keep arriving while that round-trip is in
//! flight, so the flag alone would ring on every poll. Requests can also be
//! served out of order, so a poll issued before the ack settled may still
//! report the flag after the ack's own reply was applied.

/// What the caller should do after a snapshot was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Play the tone, then send `clear_sound`.
    Ring,
    /// The tone already played but the backend never heard the ack; resend
    /// `clear_sound` without playing again.
    Acknowledge,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Ready to ring, except for replies to requests numbered up to
    /// `quiet_through`, which may have been served before the last ack.
    Armed { quiet_through: u64 },
    AwaitingAck(u64),
    AckLost,
}

#[derive(Debug)]
pub struct Chime {
    state: State,
}

impl Default for Chime {
    fn default() -> Self {
        Self::new()
    }
}

impl Chime {
    pub fn new() -> Self {
        Chime {
            state: State::Armed { quiet_through: 0 },
        }
    }

    /// Feed the `sound_pending` flag of the snapshot applied from request
    /// `seq`. `issued` is the newest request number handed out so far.
    pub fn observe(&mut self, seq: u64, pending: bool, issued: u64) -> Cue {
        match (self.state, pending) {
            (State::Armed { quiet_through }, true) if seq > quiet_through => Cue::Ring,
            (State::Armed { .. }, _) => Cue::Nothing,
            (State::AwaitingAck(_), true) => Cue::Nothing,
            (State::AckLost, true) => Cue::Acknowledge,
            (State::AwaitingAck(_) | State::AckLost, false) => {
                self.rearm(issued);
                Cue::Nothing
            }
        }
    }

    /// `clear_sound` went out as request `seq`.
    pub fn acknowledging(&mut self, seq: u64) {
        self.state = State::AwaitingAck(seq);
    }

    /// The backend answered request `seq`. Replies to anything issued up to
    /// `issued` may predate it; a raised flag after those is a new
    /// occurrence.
    pub fn ack_confirmed(&mut self, seq: u64, issued: u64) {
        if self.state == State::AwaitingAck(seq) {
            self.rearm(issued);
        }
    }

    /// Request `seq` never reached the backend.
    pub fn ack_failed(&mut self, seq: u64) {
        if self.state == State::AwaitingAck(seq) {
            self.state = State::AckLost;
        }
    }

    fn rearm(&mut self, issued: u64) {
        self.state = State::Armed {
            quiet_through: issued,
        };
    }

    #[cfg(test)]
    pub(crate) fn awaiting_ack(&self) -> bool {
        matches!(self.state, State::AwaitingAck(_))
    }
}
