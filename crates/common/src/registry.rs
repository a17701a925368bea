use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::job::{Action, Job, JobId, MANIFEST_FILE_NAME, UPLOADS_DIR_NAME};
use crate::manifest::{Manifest, ManifestError};

// a collision on 32 random bits is rare enough that a handful
//  of retries means something else is wrong
const MAX_CREATE_ATTEMPTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("could not allocate a fresh job id")]
    Exhausted,
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Maps job ids to job workspaces.
///
/// There is no in-memory state behind this: a job exists exactly when
///  its manifest does, so `get` is answered from storage on every call.
///  A job that was created but never published (upload aborted, tool
///  never ran) stays invisible to every reader.
#[async_trait]
pub trait JobRegistry: Send + Sync + Debug + Clone + 'static {
    /// Allocate a fresh, never used id and an empty workspace for it
    async fn create(&self, action: Action) -> Result<Job, RegistryError>;

    /// Look up a published job
    async fn get(&self, id: &JobId) -> Result<Option<Job>, RegistryError>;

    /// The manifest of a published job
    async fn manifest(&self, id: &JobId) -> Result<Option<Manifest>, RegistryError>;

    /// Persist a job's manifest, which makes the job visible
    async fn publish(&self, job: &Job, manifest: &Manifest) -> Result<(), RegistryError>;

    /// Remove a job's workspace entirely
    async fn discard(&self, job: &Job) -> Result<(), RegistryError>;
}

/// Registry backed by one directory per job under a common root
#[derive(Debug, Clone)]
pub struct FsJobRegistry {
    jobs_root: PathBuf,
}

impl FsJobRegistry {
    pub fn new(jobs_root: PathBuf) -> Self {
        Self { jobs_root }
    }

    pub fn jobs_root(&self) -> &Path {
        &self.jobs_root
    }

    fn job_root(&self, id: &JobId) -> PathBuf {
        self.jobs_root.join(id.as_str())
    }
}

#[async_trait]
impl JobRegistry for FsJobRegistry {
    async fn create(&self, action: Action) -> Result<Job, RegistryError> {
        tokio::fs::create_dir_all(&self.jobs_root).await?;

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let id = JobId::generate();
            let root = self.job_root(&id);

            // create_dir (not _all) so an existing directory is never reused
            match tokio::fs::create_dir(&root).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
            tokio::fs::create_dir(root.join(UPLOADS_DIR_NAME)).await?;

            tracing::debug!(job_id = %id, root = %root.display(), "created job workspace");
            return Ok(Job::new(id, root, action));
        }

        Err(RegistryError::Exhausted)
    }

    async fn get(&self, id: &JobId) -> Result<Option<Job>, RegistryError> {
        let root = self.job_root(id);
        Ok(self
            .manifest(id)
            .await?
            .map(|manifest| Job::new(id.clone(), root, manifest.action)))
    }

    async fn manifest(&self, id: &JobId) -> Result<Option<Manifest>, RegistryError> {
        let path = self.job_root(id).join(MANIFEST_FILE_NAME);
        let manifest = tokio::task::spawn_blocking(move || Manifest::load(&path)).await??;
        Ok(manifest)
    }

    async fn publish(&self, job: &Job, manifest: &Manifest) -> Result<(), RegistryError> {
        let path = job.manifest_path();
        let manifest = manifest.clone();
        tokio::task::spawn_blocking(move || manifest.save(&path)).await??;
        Ok(())
    }

    async fn discard(&self, job: &Job) -> Result<(), RegistryError> {
        match tokio::fs::remove_dir_all(job.root()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!(job_id = %job.id(), "discarded job workspace");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_created_job_is_invisible_until_published() {
        let temp = tempfile::TempDir::new().unwrap();
        let registry = FsJobRegistry::new(temp.path().join("jobs"));

        let job = registry.create(Action::Decrypt).await.unwrap();
        assert!(job.uploads_dir().is_dir());
        assert!(registry.get(job.id()).await.unwrap().is_none());
        assert!(registry.manifest(job.id()).await.unwrap().is_none());

        let manifest = Manifest::build(&job.uploads_dir(), job.action());
        registry.publish(&job, &manifest).await.unwrap();

        let found = registry.get(job.id()).await.unwrap().unwrap();
        assert_eq!(found, job);
        assert_eq!(found.action(), Action::Decrypt);
        assert_eq!(registry.manifest(job.id()).await.unwrap(), Some(manifest));
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let temp = tempfile::TempDir::new().unwrap();
        let registry = FsJobRegistry::new(temp.path().to_path_buf());

        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            let job = registry.create(Action::Encrypt).await.unwrap();
            assert!(ids.insert(job.id().clone()));
        }
    }

    #[tokio::test]
    async fn test_discard() {
        let temp = tempfile::TempDir::new().unwrap();
        let registry = FsJobRegistry::new(temp.path().to_path_buf());

        let job = registry.create(Action::Encrypt).await.unwrap();
        std::fs::write(job.uploads_dir().join("f"), b"x").unwrap();
        registry.discard(&job).await.unwrap();
        assert!(!job.root().exists());

        // discarding twice is fine
        registry.discard(&job).await.unwrap();
    }

    #[tokio::test]
    async fn test_directory_without_manifest_is_not_a_job() {
        let temp = tempfile::TempDir::new().unwrap();
        let registry = FsJobRegistry::new(temp.path().to_path_buf());
        let id: JobId = "job-12345678".parse().unwrap();
        std::fs::create_dir_all(temp.path().join(id.as_str()).join("uploads")).unwrap();
        assert!(registry.get(&id).await.unwrap().is_none());
    }
}
