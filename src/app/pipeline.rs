//! Shared conversion workflow used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core sequence:
//! credentials -> session transition -> gate -> history append
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{debug, info, warn};

use crate::domain::{
    ConversionOutcome, ConversionRequest, RejectReason, SessionState, StoredRecord,
};
use crate::gate::{Attempt, Gate, SessionCell};
use crate::store::{CredentialStore, HistoryStore, StoreError, StoreResult};

/// Login / sign-up failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username and password must not be empty")]
    EmptyCredentials,

    #[error("invalid username or password")]
    CredentialInvalid,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The gate plus the stores it hands records to.
pub struct ConversionService<S> {
    gate: Gate,
    store: S,
}

impl<S> ConversionService<S>
where
    S: CredentialStore + HistoryStore,
{
    pub fn new(gate: Gate, store: S) -> Self {
        Self { gate, store }
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = validate(username, password)?;
        if self.store.register(username, password)? {
            Ok(())
        } else {
            Err(AuthError::UsernameTaken(username.to_string()))
        }
    }

    /// Check credentials and move `session` to `Authenticated`.
    ///
    /// On failure the caller keeps its previous session untouched.
    pub fn login(
        &self,
        session: SessionState,
        username: &str,
        password: &str,
    ) -> Result<SessionState, AuthError> {
        let username = validate(username, password)?;
        if !self.store.verify(username, password)? {
            warn!(username, "login rejected");
            return Err(AuthError::CredentialInvalid);
        }
        info!(username, "logged in");
        Ok(session.login(username))
    }

    pub fn logout(&self, session: SessionState) -> SessionState {
        if let Some(username) = session.username() {
            info!(username, "logged out");
        }
        session.logout()
    }

    /// Run one attempt and persist its record, if any.
    pub fn convert(
        &self,
        session: SessionState,
        request: &ConversionRequest,
    ) -> (SessionState, ConversionOutcome) {
        let (next, attempt) = self.gate.attempt_conversion(session, request);
        let outcome = self.persist(attempt);
        (next, outcome)
    }

    /// Same as `convert`, for a session shared behind a `SessionCell`.
    pub fn convert_in(&self, cell: &SessionCell, request: &ConversionRequest) -> ConversionOutcome {
        let attempt = cell.attempt(&self.gate, request);
        self.persist(attempt)
    }

    /// Verify credentials and log the shared session in.
    pub fn login_in(&self, cell: &SessionCell, username: &str, password: &str) -> Result<(), AuthError> {
        let state = self.login(cell.snapshot(), username, password)?;
        if let Some(username) = state.username() {
            cell.login(username);
        }
        Ok(())
    }

    /// History for the session's user; guests have none.
    pub fn history(&self, session: &SessionState) -> StoreResult<Vec<StoredRecord>> {
        match session.username() {
            Some(username) => self.store.query(username),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, attempt: Attempt) -> ConversionOutcome {
        let Attempt { outcome, record } = attempt;
        if let ConversionOutcome::Rejected(reason) = &outcome {
            warn!(%reason, "conversion rejected");
        }
        let Some(record) = record else {
            return outcome;
        };

        match self.store.append(&record) {
            Ok(()) => {
                debug!(username = %record.username, direction = %record.direction, "recorded conversion");
                outcome
            }
            Err(err) => {
                warn!(error = %err, "failed to record conversion");
                ConversionOutcome::Rejected(RejectReason::PersistenceFailure(err.to_string()))
            }
        }
    }
}

fn validate<'a>(username: &'a str, password: &str) -> Result<&'a str, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::EmptyCredentials);
    }
    Ok(username)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::ConversionRecord;
    use crate::store::SqliteStore;

    fn service() -> ConversionService<SqliteStore> {
        ConversionService::new(Gate::default(), SqliteStore::open_in_memory().unwrap())
    }

    fn request(value: f64) -> ConversionRequest {
        ConversionRequest::new("Length", "Kilometers to Miles", value)
    }

    /// Accepts everyone, fails every history write.
    struct BrokenHistory;

    impl CredentialStore for BrokenHistory {
        fn verify(&self, _: &str, _: &str) -> StoreResult<bool> {
            Ok(true)
        }
        fn register(&self, _: &str, _: &str) -> StoreResult<bool> {
            Ok(true)
        }
    }

    impl HistoryStore for BrokenHistory {
        fn append(&self, _: &ConversionRecord) -> StoreResult<()> {
            Err(StoreError::Io {
                path: PathBuf::from("history"),
                source: std::io::Error::other("disk full"),
            })
        }
        fn query(&self, _: &str) -> StoreResult<Vec<StoredRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn register_login_convert_and_read_history() {
        let svc = service();
        svc.register("alice", "pw").unwrap();
        let session = svc.login(SessionState::new(), "alice", "pw").unwrap();

        let (session, outcome) = svc.convert(session, &request(10.0));
        assert!(outcome.is_allowed());
        let (session, _) = svc.convert(session, &request(20.0));

        let history = svc.history(&session).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].record.input, 10.0);
        assert_eq!(history[1].record.input, 20.0);
        assert!(history.iter().all(|r| r.record.username == "alice"));
    }

    #[test]
    fn guest_conversions_are_not_recorded() {
        let svc = service();
        let (session, outcome) = svc.convert(SessionState::new(), &request(1.0));
        assert!(outcome.is_allowed());
        assert_eq!(session.guest_count(), Some(1));
        assert!(svc.store().all_history().unwrap().is_empty());
        assert!(svc.history(&session).unwrap().is_empty());
    }

    #[test]
    fn wrong_password_keeps_the_session_anonymous() {
        let svc = service();
        svc.register("alice", "pw").unwrap();
        let err = svc.login(SessionState::new(), "alice", "nope").unwrap_err();
        assert!(matches!(err, AuthError::CredentialInvalid));
    }

    #[test]
    fn duplicate_registration_is_username_taken() {
        let svc = service();
        svc.register("alice", "pw").unwrap();
        let err = svc.register(" alice ", "other").unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken(name) if name == "alice"));
    }

    #[test]
    fn empty_credentials_are_refused() {
        let svc = service();
        assert!(matches!(svc.register("  ", "pw"), Err(AuthError::EmptyCredentials)));
        assert!(matches!(
            svc.login(SessionState::new(), "alice", ""),
            Err(AuthError::EmptyCredentials)
        ));
    }

    #[test]
    fn failed_append_surfaces_persistence_failure() {
        let svc = ConversionService::new(Gate::default(), BrokenHistory);
        let session = svc.login(SessionState::new(), "alice", "pw").unwrap();
        let (session, outcome) = svc.convert(session, &request(1.0));
        match outcome {
            ConversionOutcome::Rejected(RejectReason::PersistenceFailure(msg)) => {
                assert!(msg.contains("disk full"));
            }
            other => panic!("expected persistence failure, got {other:?}"),
        }
        assert!(session.is_authenticated());
    }

    #[test]
    fn guest_nan_is_rejected_and_keeps_the_count() {
        let svc = service();
        let (session, _) = svc.convert(SessionState::new(), &request(1.0));
        let (session, outcome) = svc.convert(session, &request(f64::NAN));
        assert_eq!(outcome, ConversionOutcome::Rejected(RejectReason::InvalidValue));
        assert_eq!(session.guest_count(), Some(1));
    }

    #[test]
    fn non_finite_values_never_reach_history() {
        let svc = service();
        svc.register("alice", "pw").unwrap();
        let mut session = svc.login(SessionState::new(), "alice", "pw").unwrap();
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let (next, outcome) = svc.convert(session, &request(value));
            assert_eq!(outcome, ConversionOutcome::Rejected(RejectReason::InvalidValue));
            session = next;
        }
        assert!(session.is_authenticated());
        assert!(svc.history(&session).unwrap().is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        crate::store::export_json(svc.store(), &path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("null"));
        let parsed: crate::store::ExportBundle = serde_json::from_str(&raw).unwrap();
        assert!(parsed.history.is_empty());
    }

    #[test]
    fn shared_session_rejects_nan_without_spending_quota() {
        let svc = service();
        let cell = SessionCell::default();
        assert_eq!(
            svc.convert_in(&cell, &request(f64::INFINITY)),
            ConversionOutcome::Rejected(RejectReason::InvalidValue)
        );
        assert_eq!(cell.snapshot().guest_count(), Some(0));
    }

    #[test]
    fn shared_session_runs_through_the_cell() {
        let svc = service();
        svc.register("dana", "pw").unwrap();
        let cell = SessionCell::default();

        for _ in 0..5 {
            assert!(svc.convert_in(&cell, &request(1.0)).is_allowed());
        }
        assert_eq!(
            svc.convert_in(&cell, &request(1.0)),
            ConversionOutcome::Rejected(RejectReason::QuotaExceeded)
        );

        svc.login_in(&cell, "dana", "pw").unwrap();
        assert!(svc.convert_in(&cell, &request(1.0)).is_allowed());
        assert_eq!(svc.history(&cell.snapshot()).unwrap().len(), 1);
    }

    #[test]
    fn logout_returns_to_a_fresh_guest_session() {
        let svc = service();
        svc.register("erin", "pw").unwrap();
        let session = svc.login(SessionState::new(), "erin", "pw").unwrap();
        assert_eq!(svc.logout(session), SessionState::Anonymous { guest_count: 0 });
    }
}
