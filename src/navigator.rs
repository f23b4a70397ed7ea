//! Position of a patient inside its filtered, id-ordered sequence.
//!
//! The filtered subset is every patient whose `contacted` flag equals the
//! requested value, sorted ascending by id. Navigation reports the 1-based
//! index of a patient inside that subset together with its neighbours.

use crate::storage::{patient::PatientId, StorageRead};
use crate::service::PatientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatientIndex {
    pub total: usize,
    pub current_index: usize,
    pub prev_id: Option<PatientId>,
    pub next_id: Option<PatientId>,
}

impl PatientIndex {
    /// Patient to show once the current one leaves this sequence: the next
    /// one, else the previous one.
    pub fn successor(&self) -> Option<PatientId> {
        self.next_id.or(self.prev_id)
    }
}

/// Linear scan over an already filtered sequence. `ids` must be sorted
/// ascending; returns `None` when `id` is not part of it.
pub fn locate<I>(ids: I, id: PatientId) -> Option<PatientIndex>
where
    I: IntoIterator<Item = PatientId>,
{
    let ids: Vec<PatientId> = ids.into_iter().collect();
    let position = ids.iter().position(|candidate| *candidate == id)?;

    Some(PatientIndex {
        total: ids.len(),
        current_index: position + 1,
        prev_id: position.checked_sub(1).map(|prev| ids[prev]),
        next_id: ids.get(position + 1).copied(),
    })
}

/// Resolve where `id` sits among the patients whose `contacted` flag is
/// `contacted`.
///
/// An unknown id and an id whose flag does not match both surface as
/// [`PatientError::NotFound`]; callers should pass the patient's current
/// flag, re-read after any toggle.
pub fn patient_index<S>(
    storage: &S,
    id: PatientId,
    contacted: bool,
) -> Result<PatientIndex, PatientError>
where
    S: StorageRead + ?Sized,
{
    if storage.load_patient(id)?.is_none() {
        return Err(PatientError::NotFound(id));
    }

    log::debug!("Locating patient {} in contacted={} sequence", id, contacted);

    storage
        .locate_patient(id, contacted)?
        .ok_or(PatientError::NotFound(id))
}
