// Turn controller: single-flight gate over the remote request
//
// Exactly one turn may be outstanding. `begin_turn` hands out a move-only
// ticket and `end_turn` consumes it, so a turn cannot be ended twice and the
// submission surface is re-enabled exactly once per accepted turn.

use crate::errors::AppError;
use tracing::{debug, warn};

/// The input box and submit control, as seen by the turn controller.
pub trait SubmissionSurface {
    fn set_submission_enabled(&mut self, enabled: bool);
    fn focus_input(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Ready,
    Busy,
}

/// Proof that a turn is in flight. Not `Clone`: it must be handed back to
/// [`TurnController::end_turn`] exactly once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a turn ticket must be passed to end_turn"]
pub struct TurnTicket {
    id: u64,
}

impl TurnTicket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug)]
pub struct TurnController {
    state: TurnState,
    next_id: u64,
    active: Option<u64>,
    completed: u64,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            state: TurnState::Ready,
            next_id: 1,
            active: None,
            completed: 0,
        }
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == TurnState::Busy
    }

    /// Number of turns that have been ended since startup.
    pub fn completed_turns(&self) -> u64 {
        self.completed
    }

    /// Enter `Busy` and disable the submission surface, or fail with
    /// [`AppError::Busy`] if a turn is already outstanding.
    pub fn begin_turn<S>(&mut self, surface: &mut S) -> Result<TurnTicket, AppError>
    where
        S: SubmissionSurface + ?Sized,
    {
        if self.state == TurnState::Busy {
            debug!("Turn rejected: another request is in flight");
            return Err(AppError::Busy);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.state = TurnState::Busy;
        self.active = Some(id);
        surface.set_submission_enabled(false);
        debug!("Turn {} started", id);
        Ok(TurnTicket { id })
    }

    /// Return to `Ready`, re-enable the surface and restore input focus.
    pub fn end_turn<S>(&mut self, ticket: TurnTicket, surface: &mut S)
    where
        S: SubmissionSurface + ?Sized,
    {
        if self.active != Some(ticket.id) {
            warn!(
                "Ending turn {} while turn {:?} is active",
                ticket.id, self.active
            );
        }
        self.state = TurnState::Ready;
        self.active = None;
        self.completed += 1;
        surface.set_submission_enabled(true);
        surface.focus_input();
        debug!("Turn {} ended", ticket.id);
    }
}
