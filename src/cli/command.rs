use clap::Subcommand;

use crate::cli::patient_cmd::PatientCmd;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(
        about = "Patient commands",
        long_about = "List, inspect and mark patients, and report where a patient sits in its contacted/not-contacted queue."
    )]
    Patients {
        #[command(subcommand)]
        cmd: PatientCmd,
    },
    #[command(
        about = "Insert random patients",
        long_about = "Insert COUNT randomly generated patients with a random contacted flag and gender. With --purge every existing patient is deleted first."
    )]
    Seed {
        #[arg(long, default_value_t = 20, value_name = "COUNT")]
        count: usize,
        #[arg(long, default_value_t = false, help = "Delete all patients before seeding")]
        purge: bool,
    },
}
