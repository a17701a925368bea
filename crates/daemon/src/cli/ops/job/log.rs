use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::http_server::api::v0::jobs::JobLogRequest;

#[async_trait::async_trait]
impl crate::cli::op::Op for JobLogRequest {
    type Error = ApiError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let log = ctx.client()?.fetch(&self.path()).await?;
        Ok(String::from_utf8_lossy(&log).trim_end().to_string())
    }
}
