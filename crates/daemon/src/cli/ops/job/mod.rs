use clap::Args;

pub mod fetch;
pub mod log;
pub mod show;
pub mod submit;

use crate::cli::op::Op;
use sealbox_daemon::http_server::api::v0::jobs::{GetJobRequest, JobLogRequest};

crate::subcommands! {
    Submit => submit::Submit,
    Show => GetJobRequest,
    Log => JobLogRequest,
    Fetch => fetch::Fetch,
}

pub type JobCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Job {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[async_trait::async_trait]
impl Op for Job {
    type Error = CommandError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        self.command.execute(ctx).await
    }
}
