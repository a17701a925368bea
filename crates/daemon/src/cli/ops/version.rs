use clap::Args;

use common::build_info;

#[derive(Args, Debug, Clone)]
pub struct Version {
    /// Print the build info as JSON (same shape as `/_status/version`)
    #[arg(long)]
    pub json: bool,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Version {
    type Error = serde_json::Error;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let build = build_info!();
        if self.json {
            serde_json::to_string_pretty(&build)
        } else {
            Ok(build.to_string())
        }
    }
}
