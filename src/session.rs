//! Session state: seats, roles, turn progress and the hand-off channels.
//!
//! A session lives as long as its coordinator. It becomes active with the
//! first login and is cleared once the last seat is released. All fields
//! sit behind one mutex which is never held across an await; the hand-off
//! channels carry the waiting.

use std::fmt;
use std::string::String;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::common::Outcome;
use crate::config::SEATS;
use crate::error::{CoordinatorError, HaltReason};
use crate::handoff::Channels;
use crate::protocol::{Seat, TurnRequest};
use crate::transport::ClientId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Attacker,
    Defender,
}

impl Role {
    /// Role of `seat` on the first turn.
    pub fn opening(seat: Seat) -> Self {
        if seat == 0 {
            Role::Attacker
        } else {
            Role::Defender
        }
    }

    pub fn swapped(self) -> Self {
        match self {
            Role::Attacker => Role::Defender,
            Role::Defender => Role::Attacker,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Attacker => f.write_str("attacker"),
            Role::Defender => f.write_str("defender"),
        }
    }
}

/// Progress of the current shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitAttack,
    RelayingToDefender,
    AwaitDefendResult,
    RelayingToAttacker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No seat is taken.
    Idle,
    Active,
    Finished { winner: Seat },
    Halted(HaltReason),
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub occupancy: usize,
    pub attacker: Seat,
    pub phase: TurnPhase,
    pub status: SessionStatus,
    pub turn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttackStep {
    Submit,
    Collect,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DefendStep {
    Request,
    Submit,
    Done,
}

#[derive(Debug, Clone)]
struct Occupant {
    client: ClientId,
    name: String,
}

struct SessionState {
    seats: [Option<Occupant>; SEATS],
    attacker: Seat,
    attack_step: AttackStep,
    defend_step: DefendStep,
    phase: TurnPhase,
    status: SessionStatus,
    turn: u32,
    channels: Arc<Channels>,
}

impl SessionState {
    fn new(timeout: Option<Duration>) -> Self {
        Self {
            seats: [None, None],
            attacker: 0,
            attack_step: AttackStep::Submit,
            defend_step: DefendStep::Request,
            phase: TurnPhase::AwaitAttack,
            status: SessionStatus::Idle,
            turn: 0,
            channels: Arc::new(Channels::new(timeout)),
        }
    }

    fn occupancy(&self) -> usize {
        self.seats.iter().filter(|s| s.is_some()).count()
    }

    fn seat_of(&self, client: ClientId) -> Option<Seat> {
        self.seats
            .iter()
            .position(|s| s.as_ref().is_some_and(|o| o.client == client))
            .map(|i| i as Seat)
    }

    fn role_of(&self, seat: Seat) -> Role {
        if seat == self.attacker {
            Role::Attacker
        } else {
            Role::Defender
        }
    }

    fn is_current(&self, channels: &Arc<Channels>) -> bool {
        Arc::ptr_eq(&self.channels, channels)
    }
}

/// The two-seat game session arbitrated by the coordinator.
pub struct Session {
    state: Mutex<SessionState>,
    handoff_timeout: Option<Duration>,
}

impl Session {
    pub fn new(handoff_timeout: Option<Duration>) -> Self {
        Self {
            state: Mutex::new(SessionState::new(handoff_timeout)),
            handoff_timeout,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            occupancy: state.occupancy(),
            attacker: state.attacker,
            phase: state.phase,
            status: state.status,
            turn: state.turn,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.state().occupancy()
    }

    pub fn status(&self) -> SessionStatus {
        self.state().status
    }

    pub fn seat_of(&self, client: ClientId) -> Option<Seat> {
        self.state().seat_of(client)
    }

    /// Take the lowest free seat for `client`.
    pub fn login(&self, client: ClientId, name: &str) -> Result<Seat, CoordinatorError> {
        let mut state = self.state();
        if let Some(seat) = state.seat_of(client) {
            warn!("{} logged in again; keeping seat {}", client, seat);
            return Ok(seat);
        }
        let free = state
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or(CoordinatorError::SessionFull)?;
        state.seats[free] = Some(Occupant {
            client,
            name: name.into(),
        });
        if state.status == SessionStatus::Idle {
            state.status = SessionStatus::Active;
        }
        Ok(free as Seat)
    }

    /// Release the seat held by `client`.
    ///
    /// Leaving an active game halts it. Releasing the last seat clears the
    /// session for a new game.
    pub fn logout(&self, client: ClientId) -> Option<Seat> {
        let mut state = self.state();
        let seat = state.seat_of(client)?;
        let occupant = state.seats[seat as usize].take();
        if let Some(occupant) = occupant {
            info!("Player {} released seat {}", occupant.name, seat);
        }
        if state.occupancy() == 0 {
            state.channels.halt(HaltReason::Reset);
            *state = SessionState::new(self.handoff_timeout);
            info!("session cleared");
        } else if state.status == SessionStatus::Active {
            state.status = SessionStatus::Halted(HaltReason::PlayerLeft);
            state.channels.halt(HaltReason::PlayerLeft);
            warn!("seat {} left an active game; session halted", seat);
        }
        Some(seat)
    }

    /// Validate that `client` may issue `request` now and advance its step.
    /// Returns the channels of the current game.
    pub fn authorize(
        &self,
        client: ClientId,
        request: &TurnRequest,
    ) -> Result<Arc<Channels>, CoordinatorError> {
        let mut state = self.state();
        let seat = state.seat_of(client).ok_or(CoordinatorError::NotLoggedIn)?;
        match state.status {
            SessionStatus::Active => {}
            SessionStatus::Finished { .. } => return Err(CoordinatorError::GameOver),
            SessionStatus::Halted(reason) => return Err(CoordinatorError::Halted(reason)),
            SessionStatus::Idle => return Err(CoordinatorError::NotLoggedIn),
        }
        let role = state.role_of(seat);
        let turn = state.turn;
        let violation = |expected: &str| {
            CoordinatorError::ProtocolViolation(format!(
                "seat {} sent {} as {} on turn {}; expected {}",
                seat,
                request.verb(),
                role,
                turn,
                expected
            ))
        };
        match (role, request) {
            (Role::Attacker, TurnRequest::Attack(_)) if state.attack_step == AttackStep::Submit => {
                state.attack_step = AttackStep::Collect;
            }
            (Role::Attacker, TurnRequest::AttackResult)
                if state.attack_step == AttackStep::Collect =>
            {
                state.attack_step = AttackStep::Done;
            }
            (Role::Defender, TurnRequest::Defend) if state.defend_step == DefendStep::Request => {
                state.defend_step = DefendStep::Submit;
            }
            (Role::Defender, TurnRequest::DefendResult(_))
                if state.defend_step == DefendStep::Submit =>
            {
                state.defend_step = DefendStep::Done;
            }
            (Role::Attacker, _) => {
                let expected = match state.attack_step {
                    AttackStep::Submit => "ATTACK",
                    AttackStep::Collect => "ATTACK_REQ_RESULT",
                    AttackStep::Done => "the end of the turn",
                };
                return Err(violation(expected));
            }
            (Role::Defender, _) => {
                let expected = match state.defend_step {
                    DefendStep::Request => "DEFEND",
                    DefendStep::Submit => "DEFEND_REQ_RESULT",
                    DefendStep::Done => "the end of the turn",
                };
                return Err(violation(expected));
            }
        }
        Ok(Arc::clone(&state.channels))
    }

    pub(crate) fn set_phase(&self, channels: &Arc<Channels>, phase: TurnPhase) {
        let mut state = self.state();
        if state.is_current(channels) {
            debug!("turn {}: {:?} -> {:?}", state.turn, state.phase, phase);
            state.phase = phase;
        }
    }

    /// Attacker received the outcome; the next shot may begin.
    pub(crate) fn outcome_delivered(&self, channels: &Arc<Channels>) {
        let mut state = self.state();
        if state.is_current(channels) && state.phase == TurnPhase::RelayingToAttacker {
            state.phase = TurnPhase::AwaitAttack;
        }
    }

    /// Commit the defender's outcome: swap roles and start the next turn,
    /// or finish the game on `SunkAndWon`.
    pub(crate) fn complete_turn(&self, channels: &Arc<Channels>, outcome: Outcome) {
        let mut state = self.state();
        if !state.is_current(channels) || state.status != SessionStatus::Active {
            return;
        }
        let attacker = state.attacker;
        state.phase = TurnPhase::RelayingToAttacker;
        state.attacker = 1 - attacker;
        state.attack_step = AttackStep::Submit;
        state.defend_step = DefendStep::Request;
        state.turn += 1;
        if outcome.ends_game() {
            state.status = SessionStatus::Finished { winner: attacker };
            info!("seat {} sank the last ship and won after {} turns", attacker, state.turn);
        } else {
            debug!("turn {} done ({}); seat {} attacks next", state.turn, outcome, state.attacker);
        }
    }

    /// Stop arbitrating turns and wake every parked request. Only an active
    /// game can be halted.
    pub fn halt(&self, reason: HaltReason) {
        let mut state = self.state();
        if state.status != SessionStatus::Active {
            return;
        }
        state.status = SessionStatus::Halted(reason);
        state.channels.halt(reason);
        error!("session halted: {}", reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Coordinate;

    fn client(id: u64) -> ClientId {
        ClientId::new(id)
    }

    fn seated() -> Session {
        let session = Session::new(None);
        assert_eq!(session.login(client(1), "a"), Ok(0));
        assert_eq!(session.login(client(2), "b"), Ok(1));
        session
    }

    #[test]
    fn lowest_free_seat_is_reused() {
        let session = seated();
        assert_eq!(session.login(client(3), "c"), Err(CoordinatorError::SessionFull));
        assert_eq!(session.logout(client(1)), Some(0));
        assert_eq!(session.login(client(3), "c"), Ok(0));
        assert_eq!(session.occupancy(), 2);
    }

    #[test]
    fn steps_advance_in_order() {
        let session = seated();
        let attack = TurnRequest::Attack(Coordinate::ORIGIN);
        assert!(session.authorize(client(1), &attack).is_ok());
        assert!(matches!(
            session.authorize(client(1), &attack),
            Err(CoordinatorError::ProtocolViolation(_))
        ));
        assert!(session.authorize(client(1), &TurnRequest::AttackResult).is_ok());
        assert!(session.authorize(client(2), &TurnRequest::Defend).is_ok());
        let channels = session
            .authorize(client(2), &TurnRequest::DefendResult(Outcome::Hit))
            .unwrap();

        session.complete_turn(&channels, Outcome::Hit);
        let snap = session.snapshot();
        assert_eq!(snap.attacker, 1);
        assert_eq!(snap.turn, 1);
        assert_eq!(snap.phase, TurnPhase::RelayingToAttacker);
        session.outcome_delivered(&channels);
        assert_eq!(session.snapshot().phase, TurnPhase::AwaitAttack);
        assert!(session.authorize(client(2), &attack).is_ok());
    }

    #[test]
    fn stale_channels_are_ignored() {
        let session = seated();
        let old = session
            .authorize(client(1), &TurnRequest::Attack(Coordinate::ORIGIN))
            .unwrap();
        session.logout(client(1));
        assert_eq!(old.halted(), Some(HaltReason::PlayerLeft));
        session.logout(client(2));
        // The first reason sticks through the clear.
        assert_eq!(old.halted(), Some(HaltReason::PlayerLeft));

        session.login(client(3), "c").unwrap();
        session.complete_turn(&old, Outcome::SunkAndWon);
        let snap = session.snapshot();
        assert_eq!(snap.status, SessionStatus::Active);
        assert_eq!(snap.turn, 0);
    }

    #[test]
    fn clearing_a_finished_game_halts_with_reset() {
        let session = seated();
        let channels = session
            .authorize(client(1), &TurnRequest::Attack(Coordinate::ORIGIN))
            .unwrap();
        session.complete_turn(&channels, Outcome::SunkAndWon);
        assert_eq!(session.status(), SessionStatus::Finished { winner: 0 });

        session.logout(client(1));
        assert_eq!(channels.halted(), None);
        session.logout(client(2));
        assert_eq!(channels.halted(), Some(HaltReason::Reset));
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn halt_only_applies_to_active_games() {
        let session = Session::new(None);
        session.halt(HaltReason::Timeout);
        assert_eq!(session.status(), SessionStatus::Idle);
        let session = seated();
        session.halt(HaltReason::Timeout);
        session.halt(HaltReason::ProtocolViolation);
        assert_eq!(session.status(), SessionStatus::Halted(HaltReason::Timeout));
    }
}
