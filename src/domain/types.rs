//! Shared domain types.
//!
//! Everything here is plain data: the conversion table owns the rules, the gate
//! owns the session transitions, and the stores own the records once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of non-affine-by-factor conversions used by the temperature
/// category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureFormula {
    CelsiusToFahrenheit,
    FahrenheitToCelsius,
    CelsiusToKelvin,
    KelvinToCelsius,
    FahrenheitToKelvin,
    KelvinToFahrenheit,
}

impl TemperatureFormula {
    /// Evaluate the formula exactly as written (no algebraic simplification).
    pub fn apply(self, v: f64) -> f64 {
        match self {
            TemperatureFormula::CelsiusToFahrenheit => v * 9.0 / 5.0 + 32.0,
            TemperatureFormula::FahrenheitToCelsius => (v - 32.0) * 5.0 / 9.0,
            TemperatureFormula::CelsiusToKelvin => v + 273.15,
            TemperatureFormula::KelvinToCelsius => v - 273.15,
            TemperatureFormula::FahrenheitToKelvin => (v - 32.0) * 5.0 / 9.0 + 273.15,
            TemperatureFormula::KelvinToFahrenheit => (v - 273.15) * 9.0 / 5.0 + 32.0,
        }
    }
}

/// How a single `(category, direction)` entry converts its input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionRule {
    /// `value * factor`.
    Scalar(f64),
    /// A named formula (temperature only).
    Formula(TemperatureFormula),
}

impl ConversionRule {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ConversionRule::Scalar(factor) => value * factor,
            ConversionRule::Formula(formula) => formula.apply(value),
        }
    }
}

/// Lookup failures from the conversion table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("unknown category '{category}'")]
    UnknownCategory { category: String },

    #[error("unknown conversion '{direction}' in category '{category}'")]
    UnknownDirection { category: String, direction: String },
}

/// One user interaction: convert `value` using `direction` within `category`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub category: String,
    pub direction: String,
    pub value: f64,
}

impl ConversionRequest {
    pub fn new(category: impl Into<String>, direction: impl Into<String>, value: f64) -> Self {
        Self {
            category: category.into(),
            direction: direction.into(),
            value,
        }
    }
}

/// Authorization state of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous { guest_count: u32 },
    Authenticated { username: String },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Anonymous { guest_count: 0 }
    }
}

impl SessionState {
    /// A fresh guest session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition to `Authenticated`. Credentials are checked by the caller;
    /// any guest count is discarded.
    pub fn login(self, username: impl Into<String>) -> Self {
        SessionState::Authenticated {
            username: username.into(),
        }
    }

    /// Transition back to a fresh guest session, whatever the prior state.
    pub fn logout(self) -> Self {
        SessionState::Anonymous { guest_count: 0 }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { username } => Some(username),
            SessionState::Anonymous { .. } => None,
        }
    }

    /// Guest conversions used so far (`None` when authenticated).
    pub fn guest_count(&self) -> Option<u32> {
        match self {
            SessionState::Anonymous { guest_count } => Some(*guest_count),
            SessionState::Authenticated { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Why an attempt did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("guest limit reached: please sign up or log in to continue converting")]
    QuotaExceeded,

    #[error("unknown category '{category}'")]
    UnknownCategory { category: String },

    #[error("unknown conversion '{direction}' in category '{category}'")]
    UnknownDirection { category: String, direction: String },

    #[error("value must be a finite number and convert to one")]
    InvalidValue,

    #[error("conversion could not be saved to history: {0}")]
    PersistenceFailure(String),
}

impl From<ConversionError> for RejectReason {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::UnknownCategory { category } => RejectReason::UnknownCategory { category },
            ConversionError::UnknownDirection { category, direction } => {
                RejectReason::UnknownDirection { category, direction }
            }
        }
    }
}

/// Result of one conversion attempt as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Allowed(f64),
    Rejected(RejectReason),
}

impl ConversionOutcome {
    pub fn value(&self) -> Option<f64> {
        match self {
            ConversionOutcome::Allowed(v) => Some(*v),
            ConversionOutcome::Rejected(_) => None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, ConversionOutcome::Allowed(_))
    }
}

/// A history entry emitted by the gate for an authenticated conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub username: String,
    pub category: String,
    pub direction: String,
    pub input: f64,
    pub output: f64,
}

/// A `ConversionRecord` as read back from the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    #[serde(flatten)]
    pub record: ConversionRecord,
    pub created_at: Option<DateTime<Utc>>,
}
