//! Credit ledger
//!
//! Per-account record of weekly and extra render-credit allotment versus
//! consumption. The afford check and the debit are a single atomic
//! check-and-increment, so two overlapping generation attempts from the same
//! account can never over-spend: exactly one wins the last credit and the
//! rest observe exhaustion. The remote counterpart is the conditional update
//! in [`crate::supabase::SupabaseClient::increment_consumed`].

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DebitError {
    #[error("Credit limit reached")]
    Exhausted,
}

/// Read-only view of the ledger for the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSnapshot {
    pub weekly: u32,
    pub extra: u32,
    pub used: u32,
    pub remaining: u32,
}

/// Weekly + extra allotment and the consumed counter for one account.
///
/// `consumed` only ever moves up, by exactly one per successful render;
/// cycle rollover replaces the whole ledger rather than mutating it.
#[derive(Debug)]
pub struct CreditLedger {
    weekly_allotment: u32,
    extra_allotment: u32,
    consumed: AtomicU32,
}

impl CreditLedger {
    pub fn new(weekly_allotment: u32, extra_allotment: u32, consumed: u32) -> Self {
        Self {
            weekly_allotment,
            extra_allotment,
            consumed: AtomicU32::new(consumed),
        }
    }

    pub fn limit(&self) -> u32 {
        self.weekly_allotment + self.extra_allotment
    }

    pub fn consumed(&self) -> u32 {
        self.consumed.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> u32 {
        self.limit().saturating_sub(self.consumed())
    }

    /// Cheap local gate: may a generation attempt start at all?
    pub fn can_afford(&self) -> bool {
        self.consumed() < self.limit()
    }

    /// Atomic check-and-increment. Returns the new consumed count to push to
    /// the persistence gateway, or fails if the limit was already reached.
    pub fn try_debit(&self) -> Result<u32, DebitError> {
        let limit = self.limit();
        let mut current = self.consumed.load(Ordering::Acquire);
        loop {
            if current >= limit {
                return Err(DebitError::Exhausted);
            }
            match self.consumed.compare_exchange(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Ok(current + 1),
                Err(observed) => current = observed,
            }
        }
    }

    pub fn snapshot(&self) -> CreditSnapshot {
        let used = self.consumed();
        CreditSnapshot {
            weekly: self.weekly_allotment,
            extra: self.extra_allotment,
            used,
            remaining: self.limit().saturating_sub(used),
        }
    }
}
