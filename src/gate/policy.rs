//! Pure gate logic.
//!
//! `Gate::attempt_conversion` is a function of `(SessionState, request)` to
//! `(SessionState, Attempt)`. It never touches a store; the history record it
//! returns is appended by the caller.

use tracing::debug;

use crate::convert::ConversionTable;
use crate::domain::{
    ConversionOutcome, ConversionRecord, ConversionRequest, RejectReason, SessionState,
};

/// Conversions a guest session may perform before it must authenticate.
pub const DEFAULT_GUEST_LIMIT: u32 = 5;

/// Result of a single attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub outcome: ConversionOutcome,
    /// Present only for allowed, authenticated conversions.
    pub record: Option<ConversionRecord>,
}

impl Attempt {
    fn rejected(reason: RejectReason) -> Self {
        Self {
            outcome: ConversionOutcome::Rejected(reason),
            record: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Gate {
    table: ConversionTable,
    guest_limit: u32,
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(ConversionTable::standard(), DEFAULT_GUEST_LIMIT)
    }
}

impl Gate {
    pub fn new(table: ConversionTable, guest_limit: u32) -> Self {
        Self { table, guest_limit }
    }

    pub fn table(&self) -> &ConversionTable {
        &self.table
    }

    pub fn guest_limit(&self) -> u32 {
        self.guest_limit
    }

    /// Guest conversions left for `state` (`None` when authenticated).
    pub fn remaining(&self, state: &SessionState) -> Option<u32> {
        state
            .guest_count()
            .map(|used| self.guest_limit.saturating_sub(used))
    }

    /// Decide and run one attempt.
    ///
    /// The quota check and the guest-count increment happen in this one call;
    /// callers that share a session across threads go through `SessionCell`.
    pub fn attempt_conversion(
        &self,
        state: SessionState,
        request: &ConversionRequest,
    ) -> (SessionState, Attempt) {
        match state {
            SessionState::Anonymous { guest_count } if guest_count >= self.guest_limit => {
                debug!(guest_count, limit = self.guest_limit, "guest quota exhausted");
                (state, Attempt::rejected(RejectReason::QuotaExceeded))
            }
            SessionState::Anonymous { guest_count } => {
                match self.apply(request) {
                    Ok(result) => {
                        let next = SessionState::Anonymous {
                            guest_count: guest_count + 1,
                        };
                        debug!(guest_count = guest_count + 1, "guest conversion allowed");
                        (
                            next,
                            Attempt {
                                outcome: ConversionOutcome::Allowed(result),
                                record: None,
                            },
                        )
                    }
                    Err(reason) => (state, Attempt::rejected(reason)),
                }
            }
            SessionState::Authenticated { ref username } => match self.apply(request) {
                Ok(result) => {
                    let record = ConversionRecord {
                        username: username.clone(),
                        category: request.category.clone(),
                        direction: request.direction.clone(),
                        input: request.value,
                        output: result,
                    };
                    (
                        state,
                        Attempt {
                            outcome: ConversionOutcome::Allowed(result),
                            record: Some(record),
                        },
                    )
                }
                Err(reason) => (state, Attempt::rejected(reason)),
            },
        }
    }

    /// Lookup plus range check. Never counts against the guest quota.
    fn apply(&self, request: &ConversionRequest) -> Result<f64, RejectReason> {
        if !request.value.is_finite() {
            return Err(RejectReason::InvalidValue);
        }
        let result = self
            .table
            .lookup_and_apply(&request.category, &request.direction, request.value)
            .map_err(RejectReason::from)?;
        if !result.is_finite() {
            debug!(value = request.value, "conversion overflowed");
            return Err(RejectReason::InvalidValue);
        }
        Ok(result)
    }
}
