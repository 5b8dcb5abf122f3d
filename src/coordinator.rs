//! Request dispatch for one game session.
//!
//! Login and logout are answered inline. Every turn request is authorized
//! against the session and then runs as its own task, so a request parked
//! on a hand-off never blocks requests from the other seat.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::error::CoordinatorError;
use crate::handoff::{Channels, Signal, SignalKind, Slot};
use crate::protocol::{Frame, Reply, Request, TurnRequest};
use crate::session::{Session, TurnPhase};
use crate::transport::{ClientId, Inbound, Multiplexer, MuxHandle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Bound on every hand-off wait; `None` waits forever.
    pub handoff_timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct Coordinator {
    session: Arc<Session>,
    mux: MuxHandle,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, mux: MuxHandle) -> Self {
        Self {
            session: Arc::new(Session::new(config.handoff_timeout)),
            mux,
        }
    }

    pub fn session(&self) -> Arc<Session> {
        Arc::clone(&self.session)
    }

    /// Serve requests from `mux`. The coordinator keeps a handle of its own,
    /// so this only returns when the task is aborted.
    pub async fn run(self, mut mux: Multiplexer) {
        while let Some(inbound) = mux.receive().await {
            self.handle(inbound);
        }
        debug!("multiplexer closed; coordinator stopping");
    }

    pub fn handle(&self, inbound: Inbound) {
        match inbound {
            Inbound::Request { client, frame } => self.dispatch(client, frame),
            Inbound::Disconnected(client) => {
                if let Some(seat) = self.session.logout(client) {
                    info!("{} disconnected from seat {}", client, seat);
                }
            }
        }
    }

    fn dispatch(&self, client: ClientId, frame: Frame) {
        debug!("{} -> {}", client, frame);
        let request = match Request::parse(&frame) {
            Ok(request) => request,
            Err(e) => {
                warn!("{} sent a malformed frame {}: {}", client, frame, e);
                let verb = frame.verb().unwrap_or_default();
                self.reply(client, Reply::error(verb, CoordinatorError::from(e)));
                return;
            }
        };
        match request {
            Request::Login { name } => {
                let reply = match self.session.login(client, &name) {
                    Ok(seat) => {
                        info!("Player {} logged in as seat {}", name, seat);
                        Reply::LoginOk(seat)
                    }
                    Err(e) => {
                        warn!("Player {} refused: {}", name, e);
                        Reply::LoginError
                    }
                };
                self.reply(client, reply);
            }
            Request::Logout { name } => {
                match self.session.logout(client) {
                    Some(seat) => info!(
                        "Player {} logged out of seat {}",
                        name.as_deref().unwrap_or("?"),
                        seat
                    ),
                    None => debug!("{} logged out without a seat", client),
                }
                self.reply(client, Reply::LogoutOk);
            }
            Request::Turn(turn) => match self.session.authorize(client, &turn) {
                Ok(channels) => {
                    let coordinator = self.clone();
                    tokio::spawn(async move {
                        let reply = match coordinator.step(&channels, turn).await {
                            Ok(reply) => reply,
                            Err(e) => coordinator.failed(client, turn.verb(), e),
                        };
                        coordinator.reply(client, reply);
                    });
                }
                Err(e) => {
                    let reply = self.failed(client, turn.verb(), e);
                    self.reply(client, reply);
                }
            },
        }
    }

    async fn step(
        &self,
        channels: &Arc<Channels>,
        turn: TurnRequest,
    ) -> Result<Reply, CoordinatorError> {
        match turn {
            TurnRequest::Attack(target) => {
                channels.take(Slot::ToAttacker, SignalKind::Ready).await?;
                self.session.set_phase(channels, TurnPhase::RelayingToDefender);
                channels.post(Slot::ToDefender, Signal::Coords(target)).await?;
                Ok(Reply::AttackAccepted)
            }
            TurnRequest::Defend => {
                let mut consumer = channels.consumer(Slot::ToDefender).await?;
                channels.post(Slot::ToAttacker, Signal::Ready).await?;
                match consumer.take(SignalKind::Coords).await? {
                    Signal::Coords(target) => {
                        self.session.set_phase(channels, TurnPhase::AwaitDefendResult);
                        Ok(Reply::Defend(target))
                    }
                    other => Err(unexpected(Slot::ToDefender, other)),
                }
            }
            TurnRequest::AttackResult => {
                let mut consumer = channels.consumer(Slot::ToAttacker).await?;
                channels.post(Slot::ToDefender, Signal::Ready).await?;
                match consumer.take(SignalKind::Outcome).await? {
                    Signal::Outcome(outcome) => {
                        self.session.outcome_delivered(channels);
                        Ok(Reply::AttackResult(outcome))
                    }
                    other => Err(unexpected(Slot::ToAttacker, other)),
                }
            }
            TurnRequest::DefendResult(outcome) => {
                channels.take(Slot::ToDefender, SignalKind::Ready).await?;
                // Roles swap before the attacker can see the outcome.
                self.session.complete_turn(channels, outcome);
                channels.post(Slot::ToAttacker, Signal::Outcome(outcome)).await?;
                Ok(Reply::DefendAck)
            }
        }
    }

    /// Log `err`, halt the session when it is fatal, and build the reply.
    fn failed(&self, client: ClientId, verb: &str, err: CoordinatorError) -> Reply {
        match err.halt_reason() {
            Some(reason) => {
                error!("{} {} failed: {}", client, verb, err);
                self.session.halt(reason);
            }
            None => warn!("{} {} refused: {}", client, verb, err),
        }
        Reply::error(verb, err)
    }

    fn reply(&self, client: ClientId, reply: Reply) {
        let frame = reply.encode();
        debug!("{} <- {}", client, frame);
        self.mux.reply(client, frame);
    }
}

fn unexpected(slot: Slot, signal: Signal) -> CoordinatorError {
    CoordinatorError::ProtocolViolation(format!("{} carried {:?}", slot, signal))
}
