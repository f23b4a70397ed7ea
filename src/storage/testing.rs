//! In-memory store for unit tests. Navigation goes through the default
//! linear scan of [`StorageRead::locate_patient`].

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use super::traits::{
    Gender, NewPatient, Patient, PatientId, PatientPatch, PatientSummary, Storage, StorageRead,
    StorageTx, StorageWrite,
};

#[derive(Default)]
struct State {
    patients: Vec<Patient>,
    genders: Vec<Gender>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<RwLock<State>>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn with_genders(self) -> Self {
        {
            let mut state = self.state.write().unwrap();
            state.genders = ["Female", "Male", "Other"]
                .iter()
                .enumerate()
                .map(|(i, name)| Gender {
                    id: i as i64 + 1,
                    name: name.to_string(),
                })
                .collect();
        }
        self
    }

    pub fn with_patient(self, first_name: &str, last_name: &str, contacted: bool) -> Self {
        let patient = NewPatient {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            contacted,
            ..NewPatient::default()
        };
        MemoryTx {
            state: self.state.clone(),
            fail_writes: false,
        }
        .insert_patient(&patient, Utc::now())
        .unwrap();
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }
}

fn read_patient(state: &State, id: PatientId) -> Option<Patient> {
    state.patients.iter().find(|p| p.id == id).cloned()
}

fn read_patients(state: &State, contacted: bool) -> Vec<PatientSummary> {
    let mut rows: Vec<PatientSummary> = state
        .patients
        .iter()
        .filter(|p| p.contacted == contacted)
        .map(PatientSummary::from)
        .collect();
    rows.sort_by_key(|p| p.id);
    rows
}

impl StorageRead for MemoryStorage {
    fn load_patient(&self, id: PatientId) -> anyhow::Result<Option<Patient>> {
        Ok(read_patient(&self.state.read().unwrap(), id))
    }

    fn list_patients(&self, contacted: bool) -> anyhow::Result<Vec<PatientSummary>> {
        Ok(read_patients(&self.state.read().unwrap(), contacted))
    }

    fn count_patients(&self, contacted: bool) -> anyhow::Result<usize> {
        Ok(read_patients(&self.state.read().unwrap(), contacted).len())
    }

    fn load_gender(&self, id: i64) -> anyhow::Result<Option<Gender>> {
        let state = self.state.read().unwrap();
        Ok(state.genders.iter().find(|g| g.id == id).cloned())
    }

    fn list_genders(&self) -> anyhow::Result<Vec<Gender>> {
        Ok(self.state.read().unwrap().genders.clone())
    }
}

impl Storage for MemoryStorage {
    type Tx = MemoryTx;

    fn begin_tx(&self) -> anyhow::Result<Self::Tx> {
        Ok(MemoryTx {
            state: self.state.clone(),
            fail_writes: self.fail_writes,
        })
    }
}

/// Writes land immediately; `commit` is a no-op.
pub struct MemoryTx {
    state: Arc<RwLock<State>>,
    fail_writes: bool,
}

impl MemoryTx {
    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes {
            return Err(anyhow!("disk I/O error"));
        }
        Ok(())
    }
}

impl StorageRead for MemoryTx {
    fn load_patient(&self, id: PatientId) -> anyhow::Result<Option<Patient>> {
        Ok(read_patient(&self.state.read().unwrap(), id))
    }

    fn list_patients(&self, contacted: bool) -> anyhow::Result<Vec<PatientSummary>> {
        Ok(read_patients(&self.state.read().unwrap(), contacted))
    }

    fn count_patients(&self, contacted: bool) -> anyhow::Result<usize> {
        Ok(read_patients(&self.state.read().unwrap(), contacted).len())
    }

    fn load_gender(&self, id: i64) -> anyhow::Result<Option<Gender>> {
        let state = self.state.read().unwrap();
        Ok(state.genders.iter().find(|g| g.id == id).cloned())
    }

    fn list_genders(&self) -> anyhow::Result<Vec<Gender>> {
        Ok(self.state.read().unwrap().genders.clone())
    }
}

impl StorageWrite for MemoryTx {
    fn insert_patient(
        &self,
        patient: &NewPatient,
        now: DateTime<Utc>,
    ) -> anyhow::Result<PatientId> {
        self.check_writable()?;
        let mut state = self.state.write().unwrap();
        let gender = match patient.gender_id {
            Some(gid) => Some(
                state
                    .genders
                    .iter()
                    .find(|g| g.id == gid)
                    .cloned()
                    .ok_or_else(|| anyhow!("FOREIGN KEY constraint failed"))?,
            ),
            None => None,
        };
        state.last_id += 1;
        let id = PatientId::new(state.last_id);
        state.patients.push(Patient {
            id,
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            ssn: patient.ssn.clone(),
            contacted: patient.contacted,
            gender,
            created: now,
            updated: now,
        });
        Ok(id)
    }

    fn update_patient(
        &self,
        id: PatientId,
        patch: &PatientPatch,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        self.check_writable()?;
        let mut state = self.state.write().unwrap();
        let gender = match patch.gender_id {
            Some(Some(gid)) => Some(Some(
                state
                    .genders
                    .iter()
                    .find(|g| g.id == gid)
                    .cloned()
                    .ok_or_else(|| anyhow!("FOREIGN KEY constraint failed"))?,
            )),
            Some(None) => Some(None),
            None => None,
        };
        let Some(row) = state.patients.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if let Some(first_name) = &patch.first_name {
            row.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            row.last_name = last_name.clone();
        }
        if let Some(ssn) = &patch.ssn {
            row.ssn = ssn.clone();
        }
        if let Some(contacted) = patch.contacted {
            row.contacted = contacted;
        }
        if let Some(gender) = gender {
            row.gender = gender;
        }
        row.updated = now;
        Ok(true)
    }

    fn delete_all_patients(&self) -> anyhow::Result<usize> {
        self.check_writable()?;
        let mut state = self.state.write().unwrap();
        let removed = state.patients.len();
        state.patients.clear();
        Ok(removed)
    }
}

impl StorageTx for MemoryTx {
    fn commit(self) -> anyhow::Result<()> {
        Ok(())
    }
}
