use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::v0::jobs::{GetJobRequest, GetJobResponse};

#[async_trait::async_trait]
impl crate::cli::op::Op for GetJobRequest {
    type Error = ApiError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let mut client = ctx.client()?;
        let response: GetJobResponse = client.call(self.clone()).await?;

        let mut lines = vec![format!("Job {} ({})", response.job_id, response.action)];
        if let Some(tool) = response.tool.filter(|t| !t.success) {
            let code = tool
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_string());
            lines.push(format!("tool failed with exit code {}", code));
        }
        if response.files.is_empty() {
            lines.push("(no files)".to_string());
        }
        for file in &response.files {
            lines.push(format!("{:>12}  {}", file.size, file.path));
        }
        Ok(lines.join("\n"))
    }
}
