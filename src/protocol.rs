//! Wire protocol: frames of UTF-8 text fields whose first field is the verb.

use std::fmt;
use std::string::{String, ToString};
use std::vec::Vec;

use crate::common::{Coordinate, Outcome};

pub const LOGIN: &str = "LOGIN";
pub const LOGIN_OK: &str = "LOGIN_OK";
pub const LOGIN_ERROR: &str = "LOGIN_ERROR";
pub const LOGOUT: &str = "LOGOUT";
pub const LOGOUT_OK: &str = "LOGOUT_OK";
pub const ATTACK: &str = "ATTACK";
pub const ATTACK_REQ_RESULT: &str = "ATTACK_REQ_RESULT";
pub const DEFEND: &str = "DEFEND";
pub const DEFEND_REQ_RESULT: &str = "DEFEND_REQ_RESULT";
pub const OK: &str = "OK";
pub const ERROR: &str = "ERROR";

/// Seat index, 0 or 1, assigned in login order.
pub type Seat = u8;

/// One message: an ordered list of text fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Frame {
    fields: Vec<String>,
}

impl Frame {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<String> {
        self.fields
    }

    pub fn verb(&self) -> Option<&str> {
        self.field(0)
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for Frame {
    fn from(fields: [S; N]) -> Self {
        Self::new(fields.iter().map(|f| f.as_ref().to_string()).collect())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.fields.join(", "))
    }
}

/// Errors produced while decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame carried no fields at all.
    Empty,
    UnknownVerb(String),
    MissingField { verb: &'static str, field: &'static str },
    InvalidCoordinate { row: String, col: String },
    InvalidOutcome(String),
    InvalidSeat(String),
    /// Reply did not match the request that was sent.
    UnexpectedReply { expected: &'static str, frame: Frame },
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty => write!(f, "empty frame"),
            ProtocolError::UnknownVerb(verb) => write!(f, "unknown verb '{}'", verb),
            ProtocolError::MissingField { verb, field } => {
                write!(f, "{} is missing field '{}'", verb, field)
            }
            ProtocolError::InvalidCoordinate { row, col } => {
                write!(f, "invalid coordinate '{} {}'", row, col)
            }
            ProtocolError::InvalidOutcome(code) => write!(f, "invalid outcome code '{}'", code),
            ProtocolError::InvalidSeat(seat) => write!(f, "invalid seat '{}'", seat),
            ProtocolError::UnexpectedReply { expected, frame } => {
                write!(f, "expected {} reply, got {}", expected, frame)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

fn required<'a>(
    frame: &'a Frame,
    index: usize,
    verb: &'static str,
    field: &'static str,
) -> Result<&'a str, ProtocolError> {
    frame
        .field(index)
        .ok_or(ProtocolError::MissingField { verb, field })
}

fn parse_coordinate(row: &str, col: &str) -> Result<Coordinate, ProtocolError> {
    Coordinate::from_wire(row, col).ok_or_else(|| ProtocolError::InvalidCoordinate {
        row: row.to_string(),
        col: col.to_string(),
    })
}

fn parse_outcome(code: &str) -> Result<Outcome, ProtocolError> {
    code.parse::<i8>()
        .ok()
        .and_then(Outcome::from_code)
        .ok_or_else(|| ProtocolError::InvalidOutcome(code.to_string()))
}

/// The four requests that make up one shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRequest {
    /// Attacker submits the target.
    Attack(Coordinate),
    /// Attacker collects the defender's outcome.
    AttackResult,
    /// Defender collects the target.
    Defend,
    /// Defender submits the outcome computed on its own board.
    DefendResult(Outcome),
}

impl TurnRequest {
    pub fn verb(&self) -> &'static str {
        match self {
            TurnRequest::Attack(_) => ATTACK,
            TurnRequest::AttackResult => ATTACK_REQ_RESULT,
            TurnRequest::Defend => DEFEND,
            TurnRequest::DefendResult(_) => DEFEND_REQ_RESULT,
        }
    }
}

/// A client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Login { name: String },
    Logout { name: Option<String> },
    Turn(TurnRequest),
}

impl Request {
    pub fn parse(frame: &Frame) -> Result<Self, ProtocolError> {
        let verb = frame.verb().ok_or(ProtocolError::Empty)?;
        let request = match verb {
            LOGIN => Request::Login {
                name: required(frame, 1, LOGIN, "name")?.to_string(),
            },
            LOGOUT => Request::Logout {
                name: frame.field(1).map(str::to_string),
            },
            ATTACK => {
                let row = required(frame, 1, ATTACK, "rowLetter")?;
                let col = required(frame, 2, ATTACK, "colDigit")?;
                Request::Turn(TurnRequest::Attack(parse_coordinate(row, col)?))
            }
            ATTACK_REQ_RESULT => Request::Turn(TurnRequest::AttackResult),
            DEFEND => Request::Turn(TurnRequest::Defend),
            DEFEND_REQ_RESULT => {
                let code = required(frame, 1, DEFEND_REQ_RESULT, "outcomeCode")?;
                Request::Turn(TurnRequest::DefendResult(parse_outcome(code)?))
            }
            other => return Err(ProtocolError::UnknownVerb(other.to_string())),
        };
        Ok(request)
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Request::Login { .. } => LOGIN,
            Request::Logout { .. } => LOGOUT,
            Request::Turn(turn) => turn.verb(),
        }
    }

    pub fn encode(&self) -> Frame {
        match self {
            Request::Login { name } => Frame::from([LOGIN, name.as_str()]),
            Request::Logout { name: Some(name) } => Frame::from([LOGOUT, name.as_str()]),
            Request::Logout { name: None } => Frame::from([LOGOUT]),
            Request::Turn(TurnRequest::Attack(at)) => Frame::new(vec![
                ATTACK.to_string(),
                at.row_letter().to_string(),
                at.col_digit().to_string(),
            ]),
            Request::Turn(TurnRequest::AttackResult) => Frame::from([ATTACK_REQ_RESULT]),
            Request::Turn(TurnRequest::Defend) => Frame::from([DEFEND]),
            Request::Turn(TurnRequest::DefendResult(outcome)) => Frame::new(vec![
                DEFEND_REQ_RESULT.to_string(),
                outcome.code().to_string(),
            ]),
        }
    }
}

/// A server reply. Every reply echoes the verb of its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    LoginOk(Seat),
    LoginError,
    LogoutOk,
    AttackAccepted,
    AttackResult(Outcome),
    Defend(Coordinate),
    DefendAck,
    /// Request refused or failed; `verb` echoes the request.
    Error { verb: String, reason: String },
}

impl Reply {
    pub fn error(verb: &str, reason: impl fmt::Display) -> Self {
        let verb = if verb.is_empty() { ERROR } else { verb };
        Reply::Error {
            verb: verb.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn verb(&self) -> &str {
        match self {
            Reply::LoginOk(_) | Reply::LoginError => LOGIN,
            Reply::LogoutOk => LOGOUT,
            Reply::AttackAccepted => ATTACK,
            Reply::AttackResult(_) => ATTACK_REQ_RESULT,
            Reply::Defend(_) => DEFEND,
            Reply::DefendAck => DEFEND_REQ_RESULT,
            Reply::Error { verb, .. } => verb,
        }
    }

    pub fn encode(&self) -> Frame {
        match self {
            Reply::LoginOk(seat) => {
                Frame::new(vec![LOGIN.to_string(), LOGIN_OK.to_string(), seat.to_string()])
            }
            Reply::LoginError => Frame::from([LOGIN, LOGIN_ERROR, ""]),
            Reply::LogoutOk => Frame::from([LOGOUT, LOGOUT_OK]),
            Reply::AttackAccepted => Frame::from([ATTACK, OK]),
            Reply::AttackResult(outcome) => Frame::new(vec![
                ATTACK_REQ_RESULT.to_string(),
                outcome.code().to_string(),
            ]),
            Reply::Defend(at) => Frame::new(vec![
                DEFEND.to_string(),
                at.row_letter().to_string(),
                at.col_digit().to_string(),
            ]),
            Reply::DefendAck => Frame::from([DEFEND_REQ_RESULT, OK]),
            Reply::Error { verb, reason } => Frame::from([verb.as_str(), ERROR, reason.as_str()]),
        }
    }

    /// Decode a reply to a request with verb `expected`.
    pub fn parse(frame: &Frame, expected: &'static str) -> Result<Self, ProtocolError> {
        let unexpected = || ProtocolError::UnexpectedReply {
            expected,
            frame: frame.clone(),
        };
        let verb = frame.verb().ok_or(ProtocolError::Empty)?;
        if verb != expected {
            return Err(unexpected());
        }
        let status = required(frame, 1, expected, "status")?;
        if status == ERROR {
            return Ok(Reply::error(verb, frame.field(2).unwrap_or_default()));
        }
        let reply = match (verb, status) {
            (LOGIN, LOGIN_OK) => {
                let seat = required(frame, 2, LOGIN, "seatIndex")?;
                let seat = seat
                    .parse::<Seat>()
                    .map_err(|_| ProtocolError::InvalidSeat(seat.to_string()))?;
                Reply::LoginOk(seat)
            }
            (LOGIN, LOGIN_ERROR) => Reply::LoginError,
            (LOGOUT, LOGOUT_OK) => Reply::LogoutOk,
            (ATTACK, OK) => Reply::AttackAccepted,
            (ATTACK_REQ_RESULT, code) => Reply::AttackResult(parse_outcome(code)?),
            (DEFEND, row) => {
                let col = required(frame, 2, DEFEND, "colDigit")?;
                Reply::Defend(parse_coordinate(row, col)?)
            }
            (DEFEND_REQ_RESULT, OK) => Reply::DefendAck,
            _ => return Err(unexpected()),
        };
        Ok(reply)
    }
}
