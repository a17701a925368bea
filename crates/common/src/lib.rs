/**
 * Job identity, actions and the on-disk
 *  layout of a job workspace.
 */
pub mod job;
/**
 * Client path sanitizing. Everything that turns
 *  a caller supplied name into a filesystem path
 *  goes through here first.
 */
pub mod sanitize;
/**
 * Writing uploaded files into a job's
 *  sandboxed uploads tree.
 */
pub mod stage;
/**
 * Running the external encrypt/decrypt tool
 *  against a job workspace.
 */
pub mod tool;
/**
 * Listing of processed output files,
 *  and the readiness marker for a job.
 */
pub mod manifest;
/**
 * Lazily built, cached zip of a job's results.
 */
pub mod archive;
/**
 * Read-time validation of client requested paths.
 */
pub mod gate;
/**
 * Job lookup and creation, keyed by job id.
 */
pub mod registry;
/**
 * Per-job critical sections.
 */
pub mod locks;
/**
 * The job state machine tying everything together:
 *  upload -> process -> list -> download.
 */
pub mod service;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::job::{Action, Job, JobId};
    pub use crate::manifest::{Manifest, ManifestEntry};
    pub use crate::registry::{FsJobRegistry, JobRegistry};
    pub use crate::service::{JobError, JobRequest, JobService, SubmitError};
    pub use crate::stage::UploadedFile;
    pub use crate::tool::{ToolInvoker, ToolOutcome};
    pub use crate::version::BuildInfo;
}
