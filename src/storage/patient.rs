use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, num::ParseIntError, str::FromStr};
use thiserror::Error;

/// Store-assigned patient identity. Ids are monotonic, so their numeric
/// order is the navigation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PatientIdParseError {
    #[error("patient id is empty")]
    Empty,
    #[error("invalid patient id: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("patient id must be positive, got {0}")]
    NotPositive(i64),
}

impl FromStr for PatientId {
    type Err = PatientIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PatientIdParseError::Empty);
        }
        let raw: i64 = trimmed.parse()?;
        if raw <= 0 {
            return Err(PatientIdParseError::NotPositive(raw));
        }
        Ok(Self(raw))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gender {
    pub id: i64,
    pub name: String,
}

/// Full patient row with the gender lookup joined in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub ssn: Option<String>,
    pub contacted: bool,
    pub gender: Option<Gender>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Listing projection; the fields needed to render an overview row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatientSummary {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub contacted: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            contacted: patient.contacted,
            created: patient.created,
            updated: patient.updated,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub ssn: Option<String>,
    pub contacted: bool,
    pub gender_id: Option<i64>,
}

/// Partial update. `None` leaves the stored value untouched; on the
/// nullable columns `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub ssn: Option<Option<String>>,
    pub contacted: Option<bool>,
    pub gender_id: Option<Option<i64>>,
}

impl PatientPatch {
    pub fn contacted(value: bool) -> Self {
        Self {
            contacted: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.ssn.is_none()
            && self.contacted.is_none()
            && self.gender_id.is_none()
    }
}
