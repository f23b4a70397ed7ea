use clap::Subcommand;

use crate::storage::traits::PatientId;

#[derive(Subcommand, Debug, Clone)]
pub enum PatientCmd {
    #[command(
        about = "List patients",
        long_about = "List patients that are not contacted (or contacted, with --contacted), ordered by id."
    )]
    List {
        #[arg(long, default_value_t = false, help = "List contacted patients")]
        contacted: bool,
    },
    #[command(
        about = "Show one patient",
        long_about = "Print every field of a patient together with its position in its contacted/not-contacted queue and the ids of its neighbours."
    )]
    Show {
        #[arg(value_name = "ID")]
        id: PatientId,
    },
    #[command(
        about = "Locate a patient in a queue",
        long_about = "Print the 1-based position, queue size and neighbouring ids of a patient within the not-contacted (or contacted, with --contacted) queue."
    )]
    Index {
        #[arg(value_name = "ID")]
        id: PatientId,
        #[arg(long, default_value_t = false, help = "Look in the contacted queue")]
        contacted: bool,
    },
    #[command(
        about = "Mark a patient as contacted",
        long_about = "Mark a patient as contacted, or as not contacted with --undo, and print the patient to visit next in the queue it left."
    )]
    Contact {
        #[arg(value_name = "ID")]
        id: PatientId,
        #[arg(long, default_value_t = false, help = "Mark as not contacted")]
        undo: bool,
    },
    #[command(
        about = "Delete every patient",
        long_about = "Hard-delete all patient rows. Ids are never reused."
    )]
    Purge,
}
