//! Single-slot hand-off channels between the attacker and defender tasks.
//!
//! Each slot is a bounded channel of capacity one: a producer waits while a
//! value is pending and a consumer waits until one arrives. Consumers of a
//! slot queue on a lock, so whoever locks first receives the next value.
//! Every wait observes the session's halt signal and, when configured, a
//! timeout.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::debug;
use tokio::sync::{mpsc, watch, Mutex, MutexGuard};

use crate::common::{Coordinate, Outcome};
use crate::error::{CoordinatorError, HaltReason};

/// Number of values a slot may hold.
pub const SLOT_CAPACITY: usize = 1;

/// The two hand-off slots of a session, named after their consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    ToAttacker,
    ToDefender,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::ToAttacker => f.write_str("toAttacker"),
            Slot::ToDefender => f.write_str("toDefender"),
        }
    }
}

/// A value passed through a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The peer is parked and waiting for the next value.
    Ready,
    Coords(Coordinate),
    Outcome(Outcome),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Ready => SignalKind::Ready,
            Signal::Coords(_) => SignalKind::Coords,
            Signal::Outcome(_) => SignalKind::Outcome,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Ready,
    Coords,
    Outcome,
}

struct Handoff {
    tx: mpsc::Sender<Signal>,
    rx: Mutex<mpsc::Receiver<Signal>>,
}

impl Handoff {
    fn new() -> Self {
        let (tx, rx) = mpsc::channel(SLOT_CAPACITY);
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

/// Both slots of one game generation plus its halt signal.
pub struct Channels {
    to_attacker: Handoff,
    to_defender: Handoff,
    halt: watch::Sender<Option<HaltReason>>,
    timeout: Option<Duration>,
}

impl Channels {
    pub fn new(timeout: Option<Duration>) -> Self {
        let (halt, _) = watch::channel(None);
        Self {
            to_attacker: Handoff::new(),
            to_defender: Handoff::new(),
            halt,
            timeout,
        }
    }

    fn handoff(&self, slot: Slot) -> &Handoff {
        match slot {
            Slot::ToAttacker => &self.to_attacker,
            Slot::ToDefender => &self.to_defender,
        }
    }

    /// Wake every waiter with `Halted(reason)`. The first reason sticks.
    pub fn halt(&self, reason: HaltReason) {
        self.halt.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
    }

    pub fn halted(&self) -> Option<HaltReason> {
        *self.halt.borrow()
    }

    /// Run `fut` unless the channels are halted or the wait times out first.
    async fn guarded<F: Future>(&self, slot: Slot, fut: F) -> Result<F::Output, CoordinatorError> {
        let mut halted = self.halt.subscribe();
        let halted = async move {
            let _ = halted.wait_for(Option::is_some).await;
            let reason = *halted.borrow();
            reason.unwrap_or(HaltReason::Reset)
        };
        let bounded = async {
            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, fut)
                    .await
                    .map_err(|_| CoordinatorError::Timeout(slot)),
                None => Ok(fut.await),
            }
        };
        tokio::select! {
            res = bounded => res,
            reason = halted => Err(CoordinatorError::Halted(reason)),
        }
    }

    /// Put `signal` into `slot`, waiting while the slot is occupied.
    pub async fn post(&self, slot: Slot, signal: Signal) -> Result<(), CoordinatorError> {
        let handoff = self.handoff(slot);
        if handoff.tx.capacity() == 0 {
            debug!("{} is occupied; waiting to post {:?}", slot, signal);
        }
        self.guarded(slot, handoff.tx.send(signal))
            .await?
            .map_err(|_| CoordinatorError::ProtocolViolation(format!("{} is closed", slot)))?;
        debug!("posted {:?} on {}", signal, slot);
        Ok(())
    }

    /// Become the next consumer of `slot`. Holding the returned consumer
    /// reserves the next value for it.
    pub async fn consumer(&self, slot: Slot) -> Result<Consumer<'_>, CoordinatorError> {
        let rx = self.guarded(slot, self.handoff(slot).rx.lock()).await?;
        Ok(Consumer {
            channels: self,
            slot,
            rx,
        })
    }

    /// Take the next value from `slot`, which must be of kind `expected`.
    pub async fn take(&self, slot: Slot, expected: SignalKind) -> Result<Signal, CoordinatorError> {
        self.consumer(slot).await?.take(expected).await
    }
}

/// Exclusive right to receive the next value of one slot.
pub struct Consumer<'a> {
    channels: &'a Channels,
    slot: Slot,
    rx: MutexGuard<'a, mpsc::Receiver<Signal>>,
}

impl Consumer<'_> {
    pub async fn take(&mut self, expected: SignalKind) -> Result<Signal, CoordinatorError> {
        let slot = self.slot;
        let signal = self
            .channels
            .guarded(slot, self.rx.recv())
            .await?
            .ok_or_else(|| CoordinatorError::ProtocolViolation(format!("{} is closed", slot)))?;
        if signal.kind() != expected {
            return Err(CoordinatorError::ProtocolViolation(format!(
                "{} carried {:?} where {:?} was expected",
                slot, signal, expected
            )));
        }
        debug!("took {:?} from {}", signal, slot);
        Ok(signal)
    }
}
