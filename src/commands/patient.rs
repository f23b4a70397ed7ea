use anyhow::{Context, Result};
use std::fmt::Write as _;

use super::CommandRunner;
use crate::cli;
use crate::context;
use crate::navigator::PatientIndex;
use crate::service::PatientService;
use crate::storage::traits::{Patient, PatientId, PatientPatch, PatientSummary};
use crate::storage::Storage;

impl CommandRunner for cli::PatientCmd {
    fn run(&self, ctx: &context::Context) -> Result<()> {
        let service = super::open_service(ctx);
        let out = match self {
            cli::PatientCmd::List { contacted } => {
                let patients = service.find(*contacted).context("listing patients")?;
                render_list(&patients)
            }
            cli::PatientCmd::Show { id } => {
                let patient = service.find_one(*id)?;
                let index = service
                    .patient_index(*id, patient.contacted)
                    .context("locating patient")?;
                render_detail(&patient, &index)
            }
            cli::PatientCmd::Index { id, contacted } => {
                let index = service.patient_index(*id, *contacted)?;
                render_index(*id, &index)
            }
            cli::PatientCmd::Contact { id, undo } => mark_contacted(&service, *id, !*undo)?,
            cli::PatientCmd::Purge => {
                let removed = service.hard_delete_all().context("purging patients")?;
                format!("Deleted {removed} patients")
            }
        };
        println!("{out}");
        Ok(())
    }
}

/// Sets the flag, then re-derives the position from the stored value.
fn mark_contacted<S: Storage>(
    service: &PatientService<S>,
    id: PatientId,
    contacted: bool,
) -> Result<String> {
    let before = service.find_one(id)?;
    let left_queue = service
        .patient_index(id, before.contacted)
        .context("locating patient before update")?;

    let updated = service.update(id, PatientPatch::contacted(contacted))?;
    let index = service
        .patient_index(id, updated.contacted)
        .context("locating patient after update")?;

    let mut out = format!(
        "Patient {} marked {} ({} / {})",
        id,
        contacted_label(updated.contacted),
        index.current_index,
        index.total
    );
    if before.contacted != updated.contacted {
        match left_queue.successor() {
            Some(next) => {
                let _ = write!(out, "\nNext in queue: {next}");
            }
            None => out.push_str("\nQueue is now empty"),
        }
    }
    Ok(out)
}

fn contacted_label(contacted: bool) -> &'static str {
    if contacted {
        "contacted"
    } else {
        "not contacted"
    }
}

fn render_list(patients: &[PatientSummary]) -> String {
    if patients.is_empty() {
        return "No patients".to_string();
    }
    let mut out = String::new();
    for p in patients {
        let _ = writeln!(
            out,
            "{:>6}  {:<16} {:<20} {}",
            p.id,
            p.first_name,
            p.last_name,
            p.updated.format("%d-%m-%Y")
        );
    }
    out.truncate(out.trim_end().len());
    out
}

fn render_index(id: PatientId, index: &PatientIndex) -> String {
    format!(
        "Patient {} is {} / {} (prev: {}, next: {})",
        id,
        index.current_index,
        index.total,
        display_id(index.prev_id),
        display_id(index.next_id)
    )
}

fn render_detail(patient: &Patient, index: &PatientIndex) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "({} / {}) Patient: {}",
        index.current_index,
        index.total,
        patient.ssn.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "  First name:      {}", patient.first_name);
    let _ = writeln!(out, "  Last name:       {}", patient.last_name);
    let _ = writeln!(
        out,
        "  Contacted:       {}",
        if patient.contacted { "Yes" } else { "No" }
    );
    let _ = writeln!(
        out,
        "  Gender:          {}",
        patient.gender.as_ref().map(|g| g.name.as_str()).unwrap_or("-")
    );
    let _ = writeln!(
        out,
        "  Patient created: {}",
        patient.created.format("%d-%m-%Y")
    );
    let _ = writeln!(
        out,
        "  Patient updated: {}",
        patient.updated.format("%d-%m-%Y")
    );
    let _ = write!(
        out,
        "  < {}  |  {} >",
        display_id(index.prev_id),
        display_id(index.next_id)
    );
    out
}

fn display_id(id: Option<PatientId>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryStorage;
    use crate::storage::traits::Gender;
    use chrono::{TimeZone, Utc};

    fn sample_patient() -> Patient {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        Patient {
            id: PatientId::new(3),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            ssn: Some("123-45-6789".into()),
            contacted: false,
            gender: Some(Gender {
                id: 1,
                name: "Female".into(),
            }),
            created: ts,
            updated: ts,
        }
    }

    #[test]
    fn render_detail_shows_position_and_neighbours() {
        let index = PatientIndex {
            total: 3,
            current_index: 2,
            prev_id: Some(PatientId::new(1)),
            next_id: None,
        };
        let out = render_detail(&sample_patient(), &index);

        assert!(out.starts_with("(2 / 3) Patient: 123-45-6789\n"));
        assert!(out.contains("Contacted:       No"));
        assert!(out.contains("Gender:          Female"));
        assert!(out.contains("Patient created: 09-03-2024"));
        assert!(out.ends_with("< 1  |  - >"));
    }

    #[test]
    fn render_index_prints_dashes_at_boundaries() {
        let index = PatientIndex {
            total: 1,
            current_index: 1,
            prev_id: None,
            next_id: None,
        };
        assert_eq!(
            render_index(PatientId::new(9), &index),
            "Patient 9 is 1 / 1 (prev: -, next: -)"
        );
    }

    #[test]
    fn render_list_handles_empty_and_rows() {
        assert_eq!(render_list(&[]), "No patients");
        let row = PatientSummary::from(&sample_patient());
        let out = render_list(&[row]);
        assert!(out.contains("Grace"));
        assert!(out.contains("09-03-2024"));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn mark_contacted_reports_next_in_previous_queue() {
        let storage = MemoryStorage::default()
            .with_patient("Ada", "Lovelace", false)
            .with_patient("Alan", "Turing", false)
            .with_patient("Grace", "Hopper", false)
            .with_patient("Edsger", "Dijkstra", true);
        let service = PatientService::new(storage);

        let out = mark_contacted(&service, PatientId::new(2), true).unwrap();
        assert_eq!(
            out,
            "Patient 2 marked contacted (1 / 2)\nNext in queue: 3"
        );
        assert!(service.find_one(PatientId::new(2)).unwrap().contacted);
    }

    #[test]
    fn mark_contacted_last_in_queue_reports_empty() {
        let storage = MemoryStorage::default().with_patient("Ada", "Lovelace", true);
        let service = PatientService::new(storage);

        let out = mark_contacted(&service, PatientId::new(1), false).unwrap();
        assert_eq!(out, "Patient 1 marked not contacted (1 / 1)\nQueue is now empty");
    }

    #[test]
    fn mark_contacted_without_change_has_no_queue_hint() {
        let storage = MemoryStorage::default().with_patient("Ada", "Lovelace", true);
        let service = PatientService::new(storage);

        let out = mark_contacted(&service, PatientId::new(1), true).unwrap();
        assert_eq!(out, "Patient 1 marked contacted (1 / 1)");
    }

    #[test]
    fn mark_contacted_unknown_patient_fails() {
        let service = PatientService::new(MemoryStorage::default());
        assert!(mark_contacted(&service, PatientId::new(1), true).is_err());
    }
}
