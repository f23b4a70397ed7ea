use chrono::{DateTime, Utc};

pub use super::patient::{
    Gender, NewPatient, Patient, PatientId, PatientPatch, PatientSummary,
};
use crate::navigator::{self, PatientIndex};

pub trait StorageRead {
    fn load_patient(&self, id: PatientId) -> anyhow::Result<Option<Patient>>;

    /// Patients whose `contacted` flag equals `contacted`, ascending by id.
    fn list_patients(&self, contacted: bool) -> anyhow::Result<Vec<PatientSummary>>;

    fn count_patients(&self, contacted: bool) -> anyhow::Result<usize>;

    fn load_gender(&self, id: i64) -> anyhow::Result<Option<Gender>>;

    fn list_genders(&self) -> anyhow::Result<Vec<Gender>>;

    /// Position of `id` inside the `contacted` subset. Backends with a
    /// ranked query may override the scan, keeping its boundary semantics.
    fn locate_patient(
        &self,
        id: PatientId,
        contacted: bool,
    ) -> anyhow::Result<Option<PatientIndex>> {
        let patients = self.list_patients(contacted)?;
        Ok(navigator::locate(patients.iter().map(|p| p.id), id))
    }
}

pub trait StorageWrite {
    fn insert_patient(&self, patient: &NewPatient, now: DateTime<Utc>)
        -> anyhow::Result<PatientId>;

    /// Applies the supplied fields and stamps `updated`. Returns whether a
    /// row matched.
    fn update_patient(
        &self,
        id: PatientId,
        patch: &PatientPatch,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool>;

    fn delete_all_patients(&self) -> anyhow::Result<usize>;
}

pub trait StorageTx: StorageRead + StorageWrite {
    fn commit(self) -> anyhow::Result<()>;
}

pub trait Storage: StorageRead {
    type Tx: StorageTx;

    fn begin_tx(&self) -> anyhow::Result<Self::Tx>;
}
