use crate::cli::Command;
use crate::context;
use crate::service::PatientService;
use crate::storage::SqliteStorage;

pub mod patient;
pub mod seed;

pub trait CommandRunner {
    fn run(&self, ctx: &context::Context) -> anyhow::Result<()>;
}

impl Command {
    pub fn run(&self, ctx: &context::Context) -> anyhow::Result<()> {
        match self {
            Command::Patients { cmd } => cmd.run(ctx),
            Command::Seed { count, purge } => seed::run(ctx, *count, *purge),
        }
    }
}

fn open_service(ctx: &context::Context) -> PatientService<SqliteStorage> {
    PatientService::new(SqliteStorage::new(ctx.db_path()))
}
