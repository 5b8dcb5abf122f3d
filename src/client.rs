//! Request/reply driver for one seat.

use std::boxed::Box;

use log::debug;

use crate::board::Board;
use crate::common::{Coordinate, Outcome};
use crate::protocol::{
    Reply, Request, Seat, TurnRequest, ATTACK, ATTACK_REQ_RESULT, DEFEND, DEFEND_REQ_RESULT,
    LOGIN, LOGOUT,
};
use crate::transport::Transport;

/// Speaks the session protocol over a transport. Every method sends one or
/// two requests and waits for the matching replies.
pub struct GameClient {
    transport: Box<dyn Transport>,
    seat: Option<Seat>,
}

impl GameClient {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            seat: None,
        }
    }

    pub fn seat(&self) -> Option<Seat> {
        self.seat
    }

    async fn call(&mut self, request: Request, expected: &'static str) -> anyhow::Result<Reply> {
        let frame = request.encode();
        debug!("-> {}", frame);
        self.transport.send(frame).await?;
        let frame = self.transport.recv().await?;
        debug!("<- {}", frame);
        match Reply::parse(&frame, expected)? {
            Reply::Error { verb, reason } => Err(anyhow::anyhow!("{} failed: {}", verb, reason)),
            reply => Ok(reply),
        }
    }

    fn unexpected(expected: &str, reply: Reply) -> anyhow::Error {
        anyhow::anyhow!("Expected {} reply, got {:?}", expected, reply)
    }

    pub async fn login(&mut self, name: &str) -> anyhow::Result<Seat> {
        let request = Request::Login { name: name.into() };
        match self.call(request, LOGIN).await? {
            Reply::LoginOk(seat) => {
                self.seat = Some(seat);
                Ok(seat)
            }
            Reply::LoginError => Err(anyhow::anyhow!("Login refused: session is full")),
            other => Err(Self::unexpected(LOGIN, other)),
        }
    }

    pub async fn logout(&mut self, name: &str) -> anyhow::Result<()> {
        let request = Request::Logout {
            name: Some(name.into()),
        };
        match self.call(request, LOGOUT).await? {
            Reply::LogoutOk => {
                self.seat = None;
                Ok(())
            }
            other => Err(Self::unexpected(LOGOUT, other)),
        }
    }

    /// Fire at `target` and wait for the defender's verdict.
    pub async fn attack(&mut self, target: Coordinate) -> anyhow::Result<Outcome> {
        match self.call(Request::Turn(TurnRequest::Attack(target)), ATTACK).await? {
            Reply::AttackAccepted => {}
            other => return Err(Self::unexpected(ATTACK, other)),
        }
        match self
            .call(Request::Turn(TurnRequest::AttackResult), ATTACK_REQ_RESULT)
            .await?
        {
            Reply::AttackResult(outcome) => Ok(outcome),
            other => Err(Self::unexpected(ATTACK_REQ_RESULT, other)),
        }
    }

    /// Wait for the opponent's shot, resolve it on `own` and report back.
    pub async fn defend(&mut self, own: &mut Board) -> anyhow::Result<(Coordinate, Outcome)> {
        let target = match self.call(Request::Turn(TurnRequest::Defend), DEFEND).await? {
            Reply::Defend(target) => target,
            other => return Err(Self::unexpected(DEFEND, other)),
        };
        let outcome = own.resolve_attack(target);
        match self
            .call(
                Request::Turn(TurnRequest::DefendResult(outcome)),
                DEFEND_REQ_RESULT,
            )
            .await?
        {
            Reply::DefendAck => Ok((target, outcome)),
            other => Err(Self::unexpected(DEFEND_REQ_RESULT, other)),
        }
    }
}
