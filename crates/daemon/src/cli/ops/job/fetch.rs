use std::path::PathBuf;

use clap::Args;

use common::prelude::JobId;
use sealbox_daemon::http_server::api::client::ApiError;

#[derive(Args, Debug, Clone)]
pub struct Fetch {
    /// Job whose results to download
    #[arg(long)]
    pub job_id: JobId,

    /// Where to write the zip
    #[arg(long, default_value = "processed.zip")]
    pub out: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("failed to write {0:?}: {1}")]
    Write(PathBuf, std::io::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Fetch {
    type Error = FetchError;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let archive = ctx
            .client()?
            .fetch(&format!("/download-all/{}", self.job_id))
            .await?;

        tokio::fs::write(&self.out, &archive)
            .await
            .map_err(|e| FetchError::Write(self.out.clone(), e))?;

        Ok(format!(
            "Saved {} bytes of results for {} to {}",
            archive.len(),
            self.job_id,
            self.out.display()
        ))
    }
}
