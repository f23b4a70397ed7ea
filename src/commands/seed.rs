use anyhow::{Context, Result};

use crate::context;
use crate::seed::random_patients;
use crate::service::PatientService;
use crate::storage::Storage;

pub fn run(ctx: &context::Context, count: usize, purge: bool) -> Result<()> {
    let service = super::open_service(ctx);
    let ids = seed(&service, &mut rand::thread_rng(), count, purge)?;
    match (ids.first(), ids.last()) {
        (Some(first), Some(last)) => {
            log::info!("🌱 Seeded {} patients (ids {}..={})", ids.len(), first, last)
        }
        _ => log::info!("🌱 Nothing to seed"),
    }
    Ok(())
}

fn seed<S: Storage, R: rand::Rng>(
    service: &PatientService<S>,
    rng: &mut R,
    count: usize,
    purge: bool,
) -> Result<Vec<crate::storage::traits::PatientId>> {
    if purge {
        service.hard_delete_all().context("purging patients")?;
    }
    let genders = service.genders().context("loading genders")?;
    let patients = random_patients(rng, &genders, count);
    let ids = service
        .create_many(&patients)
        .context("inserting seeded patients")?;
    Ok(ids)
}
