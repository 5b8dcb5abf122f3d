use battleships::protocol::{ProtocolError, ATTACK, ATTACK_REQ_RESULT, DEFEND, LOGIN};
use battleships::{Coordinate, Frame, Outcome, Reply, Request, TurnRequest};

fn at(row: u8, col: u8) -> Coordinate {
    Coordinate::new(row, col).unwrap()
}

#[test]
fn test_parse_requests() {
    assert_eq!(
        Request::parse(&Frame::from(["LOGIN", "alice"])).unwrap(),
        Request::Login { name: "alice".into() }
    );
    assert_eq!(
        Request::parse(&Frame::from(["LOGOUT"])).unwrap(),
        Request::Logout { name: None }
    );
    assert_eq!(
        Request::parse(&Frame::from(["ATTACK", "J", "9"])).unwrap(),
        Request::Turn(TurnRequest::Attack(at(9, 9)))
    );
    assert_eq!(
        Request::parse(&Frame::from(["DEFEND_REQ_RESULT", "-1"])).unwrap(),
        Request::Turn(TurnRequest::DefendResult(Outcome::AlreadyTried))
    );
}

#[test]
fn test_reject_malformed_requests() {
    assert_eq!(Request::parse(&Frame::default()), Err(ProtocolError::Empty));
    assert!(matches!(
        Request::parse(&Frame::from(["FIRE", "A", "1"])),
        Err(ProtocolError::UnknownVerb(_))
    ));
    assert!(matches!(
        Request::parse(&Frame::from(["ATTACK", "A"])),
        Err(ProtocolError::MissingField { verb: "ATTACK", .. })
    ));
    for (row, col) in [("K", "0"), ("a", "0"), ("A", "10"), ("AB", "1"), ("A", "x")] {
        assert!(
            matches!(
                Request::parse(&Frame::from(["ATTACK", row, col])),
                Err(ProtocolError::InvalidCoordinate { .. })
            ),
            "{} {} should be rejected",
            row,
            col
        );
    }
    assert!(matches!(
        Request::parse(&Frame::from(["DEFEND_REQ_RESULT", "4"])),
        Err(ProtocolError::InvalidOutcome(_))
    ));
}

#[test]
fn test_reply_wire_forms() {
    assert_eq!(
        Reply::LoginOk(1).encode(),
        Frame::from(["LOGIN", "LOGIN_OK", "1"])
    );
    assert_eq!(
        Reply::LoginError.encode(),
        Frame::from(["LOGIN", "LOGIN_ERROR", ""])
    );
    assert_eq!(Reply::LogoutOk.encode(), Frame::from(["LOGOUT", "LOGOUT_OK"]));
    assert_eq!(Reply::AttackAccepted.encode(), Frame::from(["ATTACK", "OK"]));
    assert_eq!(
        Reply::AttackResult(Outcome::SunkAndWon).encode(),
        Frame::from(["ATTACK_REQ_RESULT", "3"])
    );
    assert_eq!(
        Reply::Defend(at(0, 5)).encode(),
        Frame::from(["DEFEND", "A", "5"])
    );
    assert_eq!(
        Reply::DefendAck.encode(),
        Frame::from(["DEFEND_REQ_RESULT", "OK"])
    );
    assert_eq!(
        Reply::error("", "bad").encode(),
        Frame::from(["ERROR", "ERROR", "bad"])
    );
}

#[test]
fn test_parse_replies() {
    assert_eq!(
        Reply::parse(&Frame::from(["LOGIN", "LOGIN_OK", "0"]), LOGIN).unwrap(),
        Reply::LoginOk(0)
    );
    assert_eq!(
        Reply::parse(&Frame::from(["DEFEND", "C", "7"]), DEFEND).unwrap(),
        Reply::Defend(at(2, 7))
    );
    assert_eq!(
        Reply::parse(&Frame::from(["ATTACK_REQ_RESULT", "2"]), ATTACK_REQ_RESULT).unwrap(),
        Reply::AttackResult(Outcome::Sunk)
    );
    assert_eq!(
        Reply::parse(&Frame::from(["ATTACK", "ERROR", "game is over"]), ATTACK).unwrap(),
        Reply::Error {
            verb: "ATTACK".into(),
            reason: "game is over".into()
        }
    );
    assert!(matches!(
        Reply::parse(&Frame::from(["DEFEND", "A", "5"]), ATTACK),
        Err(ProtocolError::UnexpectedReply { expected: "ATTACK", .. })
    ));
}

#[test]
fn test_request_encoding_matches_wire() {
    let attack = Request::Turn(TurnRequest::Attack(at(0, 5)));
    assert_eq!(attack.encode(), Frame::from(["ATTACK", "A", "5"]));
    assert_eq!(Request::parse(&attack.encode()).unwrap(), attack);
    assert_eq!(
        Request::Turn(TurnRequest::DefendResult(Outcome::Miss)).encode(),
        Frame::from(["DEFEND_REQ_RESULT", "0"])
    );
    assert_eq!(attack.verb(), "ATTACK");
}
