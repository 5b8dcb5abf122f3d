use std::sync::Arc;
use std::time::Duration;

use battleships::transport::{InMemoryTransport, Multiplexer, Transport};
use battleships::{
    Coordinator, CoordinatorConfig, Frame, HaltReason, Session, SessionStatus, TurnPhase,
};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    session: Arc<Session>,
    mux: battleships::transport::MuxHandle,
}

fn start(config: CoordinatorConfig) -> Harness {
    let mux = Multiplexer::new();
    let handle = mux.handle();
    let coordinator = Coordinator::new(config, mux.handle());
    let session = coordinator.session();
    tokio::spawn(coordinator.run(mux));
    Harness {
        session,
        mux: handle,
    }
}

impl Harness {
    fn connect(&self) -> InMemoryTransport {
        let (client, server) = InMemoryTransport::pair();
        self.mux.attach(server);
        client
    }

    async fn player(&self, name: &str, seat: &str) -> InMemoryTransport {
        let mut t = self.connect();
        let reply = call(&mut t, &["LOGIN", name]).await;
        assert_eq!(reply, ["LOGIN", "LOGIN_OK", seat]);
        t
    }
}

async fn send(t: &mut InMemoryTransport, fields: &[&str]) {
    let frame = Frame::new(fields.iter().map(|f| f.to_string()).collect());
    t.send(frame).await.unwrap();
}

async fn recv(t: &mut InMemoryTransport) -> Vec<String> {
    timeout(WAIT, t.recv())
        .await
        .expect("reply within deadline")
        .unwrap()
        .into_fields()
}

async fn call(t: &mut InMemoryTransport, fields: &[&str]) -> Vec<String> {
    send(t, fields).await;
    recv(t).await
}

async fn eventually(session: &Session, check: impl Fn(&Session) -> bool) {
    timeout(WAIT, async {
        while !check(session) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition within deadline");
}

/// Plays one shot: `attacker` fires at `target`, `defender` answers `code`.
async fn shot(
    attacker: &mut InMemoryTransport,
    defender: &mut InMemoryTransport,
    target: [&str; 2],
    code: &str,
) {
    send(attacker, &["ATTACK", target[0], target[1]]).await;
    send(defender, &["DEFEND"]).await;
    assert_eq!(recv(attacker).await, ["ATTACK", "OK"]);
    assert_eq!(recv(defender).await, ["DEFEND", target[0], target[1]]);
    send(defender, &["DEFEND_REQ_RESULT", code]).await;
    send(attacker, &["ATTACK_REQ_RESULT"]).await;
    assert_eq!(recv(defender).await, ["DEFEND_REQ_RESULT", "OK"]);
    assert_eq!(recv(attacker).await, ["ATTACK_REQ_RESULT", code]);
}

#[tokio::test(flavor = "multi_thread")]
async fn third_login_is_refused() {
    let h = start(CoordinatorConfig::default());
    let _p0 = h.player("alice", "0").await;
    let _p1 = h.player("bob", "1").await;
    let mut p2 = h.connect();
    assert_eq!(
        call(&mut p2, &["LOGIN", "carol"]).await,
        ["LOGIN", "LOGIN_ERROR", ""]
    );
    let snap = h.session.snapshot();
    assert_eq!(snap.occupancy, 2);
    assert_eq!(snap.status, SessionStatus::Active);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_login_keeps_seat() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    assert_eq!(
        call(&mut p0, &["LOGIN", "alice"]).await,
        ["LOGIN", "LOGIN_OK", "0"]
    );
    assert_eq!(h.session.occupancy(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn one_shot_is_relayed_and_roles_swap() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let mut p1 = h.player("bob", "1").await;

    shot(&mut p0, &mut p1, ["A", "5"], "0").await;

    let snap = h.session.snapshot();
    assert_eq!(snap.attacker, 1);
    assert_eq!(snap.turn, 1);
    assert_eq!(snap.phase, TurnPhase::AwaitAttack);
    assert_eq!(snap.status, SessionStatus::Active);
}

#[tokio::test(flavor = "multi_thread")]
async fn defender_may_arrive_first() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let mut p1 = h.player("bob", "1").await;
    shot(&mut p0, &mut p1, ["A", "5"], "1").await;

    // Second turn: seat 0 defends and parks before seat 1 attacks.
    send(&mut p0, &["DEFEND"]).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    send(&mut p1, &["ATTACK", "B", "3"]).await;
    assert_eq!(recv(&mut p0).await, ["DEFEND", "B", "3"]);
    assert_eq!(recv(&mut p1).await, ["ATTACK", "OK"]);
    // Both relays are done, so neither can leave the phase behind.
    assert_eq!(h.session.snapshot().phase, TurnPhase::AwaitDefendResult);

    send(&mut p1, &["ATTACK_REQ_RESULT"]).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    send(&mut p0, &["DEFEND_REQ_RESULT", "2"]).await;
    assert_eq!(recv(&mut p1).await, ["ATTACK_REQ_RESULT", "2"]);
    assert_eq!(recv(&mut p0).await, ["DEFEND_REQ_RESULT", "OK"]);

    assert_eq!(h.session.snapshot().attacker, 0);
    assert_eq!(h.session.snapshot().turn, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn out_of_role_request_halts_session() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let mut p1 = h.player("bob", "1").await;

    send(&mut p0, &["ATTACK", "A", "1"]).await;
    // Seat 1 defends this turn; attacking is a violation.
    let reply = call(&mut p1, &["ATTACK", "C", "2"]).await;
    assert_eq!(&reply[..2], ["ATTACK", "ERROR"]);
    assert!(reply[2].contains("protocol violation"));

    let parked = recv(&mut p0).await;
    assert_eq!(&parked[..2], ["ATTACK", "ERROR"]);
    assert_eq!(
        h.session.status(),
        SessionStatus::Halted(HaltReason::ProtocolViolation)
    );

    // Later requests are refused without changing the reason.
    let reply = call(&mut p1, &["DEFEND"]).await;
    assert_eq!(&reply[..2], ["DEFEND", "ERROR"]);
    assert_eq!(
        h.session.status(),
        SessionStatus::Halted(HaltReason::ProtocolViolation)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn result_before_attack_is_a_violation() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let _p1 = h.player("bob", "1").await;
    let reply = call(&mut p0, &["ATTACK_REQ_RESULT"]).await;
    assert_eq!(&reply[..2], ["ATTACK_REQ_RESULT", "ERROR"]);
    assert_eq!(
        h.session.status(),
        SessionStatus::Halted(HaltReason::ProtocolViolation)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn finished_game_refuses_turns_without_halting() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let mut p1 = h.player("bob", "1").await;
    shot(&mut p0, &mut p1, ["E", "4"], "3").await;
    assert_eq!(h.session.status(), SessionStatus::Finished { winner: 0 });

    let reply = call(&mut p1, &["ATTACK", "A", "0"]).await;
    assert_eq!(reply, ["ATTACK", "ERROR", "game is over"]);
    assert_eq!(h.session.status(), SessionStatus::Finished { winner: 0 });
}

#[tokio::test(flavor = "multi_thread")]
async fn leaving_halts_and_last_logout_resets() {
    let h = start(CoordinatorConfig::default());
    let mut p0 = h.player("alice", "0").await;
    let mut p1 = h.player("bob", "1").await;

    send(&mut p1, &["DEFEND"]).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        call(&mut p0, &["LOGOUT", "alice"]).await,
        ["LOGOUT", "LOGOUT_OK"]
    );
    let parked = recv(&mut p1).await;
    assert_eq!(&parked[..2], ["DEFEND", "ERROR"]);
    assert_eq!(
        h.session.status(),
        SessionStatus::Halted(HaltReason::PlayerLeft)
    );

    assert_eq!(call(&mut p1, &["LOGOUT"]).await, ["LOGOUT", "LOGOUT_OK"]);
    let snap = h.session.snapshot();
    assert_eq!(snap.occupancy, 0);
    assert_eq!(snap.status, SessionStatus::Idle);
    assert_eq!(snap.turn, 0);

    // A fresh game starts from seat 0 on the same connections.
    assert_eq!(
        call(&mut p1, &["LOGIN", "bob"]).await,
        ["LOGIN", "LOGIN_OK", "0"]
    );
    assert_eq!(
        call(&mut p0, &["LOGIN", "alice"]).await,
        ["LOGIN", "LOGIN_OK", "1"]
    );
    shot(&mut p1, &mut p0, ["J", "9"], "0").await;
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_without_seat_changes_nothing() {
    let h = start(CoordinatorConfig::default());
    let _p0 = h.player("alice", "0").await;
    let mut stranger = h.connect();
    assert_eq!(
        call(&mut stranger, &["LOGOUT", "mallory"]).await,
        ["LOGOUT", "LOGOUT_OK"]
    );
    assert_eq!(h.session.occupancy(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_and_unseated_requests_are_rejected() {
    let h = start(CoordinatorConfig::default());
    let _p0 = h.player("alice", "0").await;
    let mut stranger = h.connect();

    let reply = call(&mut stranger, &["FIRE", "A", "1"]).await;
    assert_eq!(&reply[..2], ["FIRE", "ERROR"]);
    let reply = call(&mut stranger, &["ATTACK", "Z", "1"]).await;
    assert_eq!(&reply[..2], ["ATTACK", "ERROR"]);
    let reply = call(&mut stranger, &["DEFEND"]).await;
    assert_eq!(reply, ["DEFEND", "ERROR", "not logged in"]);

    let snap = h.session.snapshot();
    assert_eq!(snap.occupancy, 1);
    assert_eq!(snap.status, SessionStatus::Active);
}

#[tokio::test(flavor = "multi_thread")]
async fn stalled_peer_times_out() {
    let h = start(CoordinatorConfig {
        handoff_timeout: Some(Duration::from_millis(100)),
    });
    let mut p0 = h.player("alice", "0").await;
    let _p1 = h.player("bob", "1").await;

    let reply = call(&mut p0, &["ATTACK", "A", "1"]).await;
    assert_eq!(&reply[..2], ["ATTACK", "ERROR"]);
    assert!(reply[2].contains("toAttacker"));
    assert_eq!(h.session.status(), SessionStatus::Halted(HaltReason::Timeout));
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_connection_frees_seat() {
    let h = start(CoordinatorConfig::default());
    let p0 = h.player("alice", "0").await;
    let _p1 = h.player("bob", "1").await;
    drop(p0);
    eventually(&h.session, |s| s.occupancy() == 1).await;
    assert_eq!(h.mux.connected(), 1);
    assert_eq!(
        h.session.status(),
        SessionStatus::Halted(HaltReason::PlayerLeft)
    );

    let mut p2 = h.connect();
    assert_eq!(
        call(&mut p2, &["LOGIN", "carol"]).await,
        ["LOGIN", "LOGIN_OK", "0"]
    );
}
