//! Protection gate between the upstream transport and the downstream target.
//!
//! This module implements the integration point of the IO-PMP. It provides:
//! 1. **Admission:** One transaction at a time enters the checking state.
//! 2. **Decision:** Matcher and permission check run synchronously against a
//!    consistent snapshot of the entry table.
//! 3. **Forwarding:** Admitted transactions go downstream unchanged and the
//!    target's response is relayed back unmodified.
//! 4. **Rejection:** Denied transactions get a fabricated `AccessDenied` response
//!    and never reach the target.
//! 5. **Cancellation:** A transaction abandoned before its decision leaves no trace.
//!
//! State flow: `Idle -> Checking -> {Forwarding, Rejecting} -> Idle`.

/// Transaction and response types.
pub mod transaction;

use std::mem;

use tracing::debug;

pub use transaction::{Response, Transaction};

use crate::common::error::{GateError, ResponseError};
use crate::pmp::{Decision, DenyReason, IoPmp, Verdict};
use crate::soc::Downstream;
use crate::stats::GateStats;

/// Externally visible gate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateState {
    /// Waiting for a transaction.
    Idle,
    /// Transaction accepted, decision pending.
    Checking,
    /// Decision was allow; waiting to issue downstream.
    Forwarding,
    /// Decision was deny; waiting to return the error upstream.
    Rejecting,
}

#[derive(Debug)]
enum Slot {
    Idle,
    Checking(Transaction),
    Forwarding(Transaction),
    Rejecting(Transaction),
}

/// Decision and response for one transaction run through the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// How the protection unit decided.
    pub verdict: Verdict,
    /// What went back upstream.
    pub response: Response,
}

/// One gate in front of a downstream target.
///
/// Several gates may share a single [`IoPmp`].
#[derive(Debug)]
pub struct Gate<D> {
    pmp: IoPmp,
    downstream: D,
    slot: Slot,
    stats: GateStats,
}

impl<D: Downstream> Gate<D> {
    /// Creates an idle gate enforcing `pmp` in front of `downstream`.
    ///
    /// # Arguments
    ///
    /// * `pmp` - Protection unit handle; clones of it may back other gates.
    /// * `downstream` - Target that receives admitted transactions.
    pub fn new(pmp: IoPmp, downstream: D) -> Self {
        Self {
            pmp,
            downstream,
            slot: Slot::Idle,
            stats: GateStats::default(),
        }
    }

    /// Current state.
    pub const fn state(&self) -> GateState {
        match self.slot {
            Slot::Idle => GateState::Idle,
            Slot::Checking(_) => GateState::Checking,
            Slot::Forwarding(_) => GateState::Forwarding,
            Slot::Rejecting(_) => GateState::Rejecting,
        }
    }

    /// Counters accumulated so far.
    pub const fn stats(&self) -> &GateStats {
        &self.stats
    }

    /// Protection unit this gate enforces.
    pub const fn pmp(&self) -> &IoPmp {
        &self.pmp
    }

    /// Target side.
    pub const fn downstream(&self) -> &D {
        &self.downstream
    }

    /// Target side, mutably (e.g. to seed memory).
    pub const fn downstream_mut(&mut self) -> &mut D {
        &mut self.downstream
    }

    /// Consumes the gate and returns the target side.
    pub fn into_downstream(self) -> D {
        self.downstream
    }

    /// Takes a transaction from the transport side.
    ///
    /// # Arguments
    ///
    /// * `txn` - The request; held in the checking state until [`Gate::check`].
    ///
    /// # Errors
    ///
    /// [`GateError::Busy`] if another transaction is in flight; `txn` is dropped.
    pub fn accept(&mut self, txn: Transaction) -> Result<(), GateError> {
        if !matches!(self.slot, Slot::Idle) {
            return Err(GateError::Busy);
        }
        self.stats.transactions += 1;
        self.slot = Slot::Checking(txn);
        Ok(())
    }

    /// Cancels the transaction awaiting its decision.
    ///
    /// Returns it to the caller. Outside the checking state this does nothing
    /// and returns `None`.
    pub fn abandon(&mut self) -> Option<Transaction> {
        match mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Checking(txn) => {
                self.stats.abandoned += 1;
                debug!(address = txn.address, length = txn.length, "transaction abandoned");
                Some(txn)
            }
            other => {
                self.slot = other;
                None
            }
        }
    }

    /// Decides the accepted transaction.
    ///
    /// A write whose payload is not exactly `length` bytes is denied as
    /// malformed without consulting the table, so the range that was checked
    /// is always the range the target would touch.
    ///
    /// # Returns
    ///
    /// The verdict. The gate moves to `Forwarding` on allow and `Rejecting` on deny.
    ///
    /// # Errors
    ///
    /// [`GateError::NotChecking`] if no transaction is awaiting a decision.
    pub fn check(&mut self) -> Result<Verdict, GateError> {
        let txn = match mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Checking(txn) => txn,
            other => {
                self.slot = other;
                return Err(GateError::NotChecking);
            }
        };

        let verdict = match txn.payload_mismatch() {
            Some(malformed) => Verdict {
                matched: None,
                decision: Decision::Deny(DenyReason::Malformed(malformed)),
            },
            None => self.pmp.decide(txn.address, txn.length, txn.access),
        };
        self.stats.record(verdict.decision);
        debug!(
            address = txn.address,
            length = txn.length,
            access = %txn.access,
            matched = ?verdict.matched,
            decision = ?verdict.decision,
            "gate decision"
        );

        self.slot = if verdict.decision.is_allowed() {
            Slot::Forwarding(txn)
        } else {
            Slot::Rejecting(txn)
        };
        Ok(verdict)
    }

    /// Finishes the decided transaction and returns the upstream response.
    ///
    /// # Returns
    ///
    /// The target's response, relayed unmodified, for a forwarded transaction;
    /// `Response::Error(AccessDenied)` for a rejected one. The gate is idle afterwards.
    ///
    /// # Errors
    ///
    /// [`GateError::NothingToComplete`] if no decision has been made.
    pub fn complete(&mut self) -> Result<Response, GateError> {
        match mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Forwarding(txn) => {
                let response = self.downstream.issue(&txn);
                if !response.is_ok() {
                    self.stats.downstream_errors += 1;
                }
                Ok(response)
            }
            Slot::Rejecting(_) => Ok(Response::Error(ResponseError::AccessDenied)),
            other => {
                self.slot = other;
                Err(GateError::NothingToComplete)
            }
        }
    }

    /// Runs one transaction through the whole cycle, keeping the verdict.
    ///
    /// # Errors
    ///
    /// [`GateError::Busy`] if the gate was not idle.
    pub fn process(&mut self, txn: Transaction) -> Result<Completion, GateError> {
        self.accept(txn)?;
        let verdict = self.check()?;
        let response = self.complete()?;
        Ok(Completion { verdict, response })
    }

    /// Runs one transaction through the whole cycle.
    ///
    /// # Errors
    ///
    /// [`GateError::Busy`] if the gate was not idle.
    pub fn submit(&mut self, txn: Transaction) -> Result<Response, GateError> {
        self.process(txn).map(|completion| completion.response)
    }
}
