pub mod daemon;
pub mod health;
pub mod init;
pub mod job;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use job::Job;
pub use version::Version;
