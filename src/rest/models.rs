use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::navigator::PatientIndex;
use crate::storage::traits::{Gender, NewPatient, Patient, PatientId, PatientPatch, PatientSummary};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

/// `?contacted=true|false`; absent means not contacted.
#[derive(Deserialize)]
pub struct ContactedQuery {
    #[serde(default)]
    pub contacted: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct GenderResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListPatientResponse {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub contacted: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DetailedPatientResponse {
    pub id: PatientId,
    pub first_name: String,
    pub last_name: String,
    pub ssn: Option<String>,
    pub contacted: bool,
    pub gender: Option<GenderResponse>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientIndexResponse {
    pub total: usize,
    pub current_index: usize,
    pub next_id: Option<PatientId>,
    pub prev_id: Option<PatientId>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub ssn: Option<String>,
    #[serde(default)]
    pub contacted: bool,
    #[serde(default)]
    pub gender_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub ssn: Option<Option<String>>,
    #[serde(default)]
    pub contacted: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender_id: Option<Option<i64>>,
}

/// Marks a field as supplied, so an explicit `null` arrives as `Some(None)`
/// while a missing key falls back to `None` through `#[serde(default)]`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl From<Gender> for GenderResponse {
    fn from(gender: Gender) -> Self {
        Self {
            id: gender.id,
            name: gender.name,
        }
    }
}

impl From<PatientSummary> for ListPatientResponse {
    fn from(p: PatientSummary) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            contacted: p.contacted,
            created: p.created,
            updated: p.updated,
        }
    }
}

impl From<Patient> for DetailedPatientResponse {
    fn from(p: Patient) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            ssn: p.ssn,
            contacted: p.contacted,
            gender: p.gender.map(GenderResponse::from),
            created: p.created,
            updated: p.updated,
        }
    }
}

impl From<PatientIndex> for PatientIndexResponse {
    fn from(index: PatientIndex) -> Self {
        Self {
            total: index.total,
            current_index: index.current_index,
            next_id: index.next_id,
            prev_id: index.prev_id,
        }
    }
}

impl From<CreatePatientRequest> for NewPatient {
    fn from(req: CreatePatientRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            ssn: req.ssn,
            contacted: req.contacted,
            gender_id: req.gender_id,
        }
    }
}

impl From<UpdatePatientRequest> for PatientPatch {
    fn from(req: UpdatePatientRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            ssn: req.ssn,
            contacted: req.contacted,
            gender_id: req.gender_id,
        }
    }
}
