//! # Execution Context
//!
//! Per-transaction (or per-epoch-transition) context handed to every
//! key-manager entry point.
//!
//! ## Execution Modes
//!
//! ```text
//! Mode        Validate   Charge gas   Commit
//! ------------------------------------------
//! CheckOnly   yes        no           no
//! Simulate    yes        yes          no
//! Deliver     yes        yes          yes
//! ```
//!
//! All modes produce the same validation verdict for the same input and
//! state snapshot.

use keyward_common::keymanager::{Event, GasCosts, GasOp, KeyManagerError};
use keyward_common::{EpochTime, PublicKey};

// ════════════════════════════════════════════════════════════════════════════
// GAS ACCOUNTANT
// ════════════════════════════════════════════════════════════════════════════

/// Tracks gas used against a fixed limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasAccountant {
    limit: u64,
    used: u64,
}

impl GasAccountant {
    pub fn new(limit: u64) -> Self {
        GasAccountant { limit, used: 0 }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.used
    }

    /// Charge `multiplier` units of `op`.
    ///
    /// On failure nothing is charged.
    pub fn use_gas(&mut self, multiplier: u64, op: GasOp, costs: &GasCosts) -> Result<(), KeyManagerError> {
        let exhausted = |wanted: u64| KeyManagerError::BudgetExhausted {
            limit: self.limit,
            used: self.used,
            wanted,
        };

        let amount = costs.cost(op).checked_mul(multiplier).ok_or_else(|| exhausted(u64::MAX))?;
        let total = self.used.checked_add(amount).ok_or_else(|| exhausted(amount))?;
        if total > self.limit {
            return Err(exhausted(amount));
        }
        self.used = total;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CONTEXT
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Mempool admission: validation only.
    CheckOnly,
    /// Gas estimation: validation and metering.
    Simulate,
    /// Block execution: validation, metering and commit.
    Deliver,
}

/// Context of one transaction or epoch transition.
#[derive(Debug, Clone)]
pub struct Context {
    mode: ExecutionMode,
    tx_signer: Option<PublicKey>,
    epoch: EpochTime,
    now: u64,
    height: u64,
    gas: GasAccountant,
    events: Vec<Event>,
}

impl Context {
    /// Context for a transaction signed by `signer`.
    pub fn for_tx(
        mode: ExecutionMode,
        signer: PublicKey,
        epoch: EpochTime,
        now: u64,
        height: u64,
        gas_limit: u64,
    ) -> Self {
        Context {
            mode,
            tx_signer: Some(signer),
            epoch,
            now,
            height,
            gas: GasAccountant::new(gas_limit),
            events: Vec::new(),
        }
    }

    /// Context for block-level processing (epoch transitions). No signer
    /// and no gas.
    pub fn for_block(epoch: EpochTime, now: u64, height: u64) -> Self {
        Context {
            mode: ExecutionMode::Deliver,
            tx_signer: None,
            epoch,
            now,
            height,
            gas: GasAccountant::new(0),
            events: Vec::new(),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn is_check_only(&self) -> bool {
        self.mode == ExecutionMode::CheckOnly
    }

    pub fn is_simulation(&self) -> bool {
        self.mode == ExecutionMode::Simulate
    }

    /// Signer of the current transaction.
    pub fn tx_signer(&self) -> Result<PublicKey, KeyManagerError> {
        self.tx_signer
            .ok_or_else(|| KeyManagerError::Unauthorized("no transaction signer".to_string()))
    }

    pub fn current_epoch(&self) -> EpochTime {
        self.epoch
    }

    /// Block timestamp (Unix seconds).
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn block_height(&self) -> u64 {
        self.height
    }

    pub fn gas(&self) -> &GasAccountant {
        &self.gas
    }

    pub fn gas_mut(&mut self) -> &mut GasAccountant {
        &mut self.gas
    }

    /// Record an event for later delivery. Events keep insertion order.
    pub fn emit_event(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn costs() -> GasCosts {
        GasCosts { update_policy: 10, publish_master_secret: 20, publish_ephemeral_secret: 30 }
    }

    #[test]
    fn test_use_gas_within_limit() {
        let mut gas = GasAccountant::new(50);
        assert!(gas.use_gas(1, GasOp::PublishMasterSecret, &costs()).is_ok());
        assert!(gas.use_gas(1, GasOp::PublishEphemeralSecret, &costs()).is_ok());
        assert_eq!(gas.used(), 50);
        assert_eq!(gas.remaining(), 0);
    }

    #[test]
    fn test_use_gas_exhausted_charges_nothing() {
        let mut gas = GasAccountant::new(25);
        assert!(gas.use_gas(1, GasOp::PublishMasterSecret, &costs()).is_ok());
        let err = gas.use_gas(1, GasOp::UpdatePolicy, &costs()).unwrap_err();
        assert_eq!(err, KeyManagerError::BudgetExhausted { limit: 25, used: 20, wanted: 10 });
        assert_eq!(gas.used(), 20);
    }

    #[test]
    fn test_use_gas_overflow() {
        let mut gas = GasAccountant::new(u64::MAX);
        assert!(gas.use_gas(u64::MAX, GasOp::UpdatePolicy, &costs()).is_err());
        assert_eq!(gas.used(), 0);
    }

    #[test]
    fn test_block_context_has_no_signer() {
        let ctx = Context::for_block(3, 1_700_000_000, 10);
        assert!(ctx.tx_signer().is_err());
        assert_eq!(ctx.mode(), ExecutionMode::Deliver);
    }

    #[test]
    fn test_modes() {
        let signer = PublicKey([1; 32]);
        assert!(Context::for_tx(ExecutionMode::CheckOnly, signer, 0, 0, 0, 0).is_check_only());
        assert!(Context::for_tx(ExecutionMode::Simulate, signer, 0, 0, 0, 0).is_simulation());
        let deliver = Context::for_tx(ExecutionMode::Deliver, signer, 0, 0, 0, 0);
        assert!(!deliver.is_check_only() && !deliver.is_simulation());
    }
}
