use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Track which patients have been contacted and step through them one by one",
    long_about = "Serves a REST API over a SQLite patient table and offers one-shot commands to seed, list, inspect and mark patients.\n\nWithout a subcommand the REST daemon is started.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        default_value_t = false,
        help = "Reset all persisted state (delete the SQLite database) before starting"
    )]
    pub reset: bool,

    #[arg(
        long,
        env = "CONTACT_PATIENT_DATA_DIR",
        default_value = ".contact-patient/",
        value_name = "DIR",
        help = "Directory to store persistent data"
    )]
    pub data_dir: String,

    #[arg(
        long = "log-file",
        env = "CONTACT_PATIENT_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[arg(
        long = "api-listen",
        env = "CONTACT_PATIENT_API_LISTEN",
        value_name = "ADDR",
        default_value = "127.0.0.1:3333",
        help = "REST API listen address (host:port)"
    )]
    pub api_listen: std::net::SocketAddr,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PatientCmd;

    #[test]
    fn defaults_run_the_daemon() {
        let cli = Cli::try_parse_from(["contact-patient"]).unwrap();
        assert!(cli.cmd.is_none());
        assert!(!cli.reset);
        assert_eq!(cli.api_listen.port(), 3333);
    }

    #[test]
    fn parses_seed_command() {
        let cli = Cli::try_parse_from(["contact-patient", "seed", "--count", "25", "--purge"])
            .unwrap();
        match cli.cmd {
            Some(Command::Seed { count, purge }) => {
                assert_eq!(count, 25);
                assert!(purge);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_patient_index_command() {
        let cli = Cli::try_parse_from([
            "contact-patient",
            "--data-dir",
            "/tmp/cp",
            "patients",
            "index",
            "7",
            "--contacted",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, "/tmp/cp");
        match cli.cmd {
            Some(Command::Patients {
                cmd: PatientCmd::Index { id, contacted },
            }) => {
                assert_eq!(id.get(), 7);
                assert!(contacted);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_non_numeric_patient_id() {
        assert!(Cli::try_parse_from(["contact-patient", "patients", "show", "abc"]).is_err());
    }
}
