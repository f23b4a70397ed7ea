use chrono::Utc;
use thiserror::Error;

use crate::navigator::{self, PatientIndex};
use crate::storage::traits::{
    Gender, NewPatient, Patient, PatientId, PatientPatch, PatientSummary, Storage, StorageRead,
    StorageTx, StorageWrite,
};

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("patient with id {0} not found")]
    NotFound(PatientId),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// CRUD operations over the patient table plus navigation.
#[derive(Clone)]
pub struct PatientService<S> {
    storage: S,
}

impl<S: Storage> PatientService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn find_one(&self, id: PatientId) -> Result<Patient, PatientError> {
        self.storage
            .load_patient(id)?
            .ok_or(PatientError::NotFound(id))
    }

    pub fn find(&self, contacted: bool) -> Result<Vec<PatientSummary>, PatientError> {
        Ok(self.storage.list_patients(contacted)?)
    }

    pub fn count(&self, contacted: bool) -> Result<usize, PatientError> {
        Ok(self.storage.count_patients(contacted)?)
    }

    pub fn genders(&self) -> Result<Vec<Gender>, PatientError> {
        Ok(self.storage.list_genders()?)
    }

    pub fn create(&self, patient: NewPatient) -> Result<Patient, PatientError> {
        let ids = self.create_many(std::slice::from_ref(&patient))?;
        let id = ids[0];
        self.find_one(id)
    }

    /// Inserts every patient in one transaction; nothing is written when
    /// any of them is rejected.
    pub fn create_many(&self, patients: &[NewPatient]) -> Result<Vec<PatientId>, PatientError> {
        let tx = self.storage.begin_tx()?;
        for patient in patients {
            validate_name("firstName", &patient.first_name)?;
            validate_name("lastName", &patient.last_name)?;
            if let Some(gender_id) = patient.gender_id {
                ensure_gender(&tx, gender_id)?;
            }
        }

        let now = Utc::now();
        let mut ids = Vec::with_capacity(patients.len());
        for patient in patients {
            ids.push(tx.insert_patient(patient, now)?);
        }
        tx.commit()?;
        log::debug!("Created {} patient(s)", ids.len());
        Ok(ids)
    }

    /// Merges the supplied fields into the stored patient and returns the
    /// persisted result.
    pub fn update(&self, id: PatientId, patch: PatientPatch) -> Result<Patient, PatientError> {
        if patch.is_empty() {
            return self.find_one(id);
        }
        if let Some(first_name) = &patch.first_name {
            validate_name("firstName", first_name)?;
        }
        if let Some(last_name) = &patch.last_name {
            validate_name("lastName", last_name)?;
        }

        let tx = self.storage.begin_tx()?;
        if tx.load_patient(id)?.is_none() {
            return Err(PatientError::NotFound(id));
        }
        if let Some(Some(gender_id)) = patch.gender_id {
            ensure_gender(&tx, gender_id)?;
        }
        if !tx.update_patient(id, &patch, Utc::now())? {
            return Err(PatientError::NotFound(id));
        }
        let updated = tx.load_patient(id)?.ok_or(PatientError::NotFound(id))?;
        tx.commit()?;

        if let Some(contacted) = patch.contacted {
            log::info!("Patient {} marked contacted={}", id, contacted);
        }
        Ok(updated)
    }

    pub fn hard_delete_all(&self) -> Result<usize, PatientError> {
        let tx = self.storage.begin_tx()?;
        let removed = tx.delete_all_patients()?;
        tx.commit()?;
        log::warn!("Deleted all patients ({} rows)", removed);
        Ok(removed)
    }

    pub fn patient_index(
        &self,
        id: PatientId,
        contacted: bool,
    ) -> Result<PatientIndex, PatientError> {
        navigator::patient_index(&self.storage, id, contacted)
    }
}

fn validate_name(field: &str, value: &str) -> Result<(), PatientError> {
    if value.trim().is_empty() {
        return Err(PatientError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn ensure_gender<R: StorageRead + ?Sized>(storage: &R, gender_id: i64) -> Result<(), PatientError> {
    match storage.load_gender(gender_id)? {
        Some(_) => Ok(()),
        None => Err(PatientError::InvalidInput(format!(
            "unknown gender id {gender_id}"
        ))),
    }
}
