mod args;
mod command;
mod patient_cmd;

pub use args::Cli;
pub use command::Command;
pub use patient_cmd::PatientCmd;

pub use args::parse;
