//! Plumbing shared by every `sealbox` subcommand

use std::error::Error;
use std::path::PathBuf;

use url::Url;

use sealbox_daemon::http_server::api::client::{ApiClient, ApiError};
use sealbox_daemon::state::AppState;

/// Port the daemon listens on when nothing says otherwise
const FALLBACK_PORT: u16 = 5057;

/// What a subcommand runs against.
///
/// Local commands only read the config directory. Commands that talk to
///  the daemon build a client for `remote`, which is the `--remote` flag
///  or localhost on the configured `app_port`.
#[derive(Debug, Clone)]
pub struct OpContext {
    pub remote: Url,
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(remote: Option<Url>, config_path: Option<PathBuf>) -> Result<Self, url::ParseError> {
        let remote = match remote {
            Some(url) => url,
            None => {
                let port = AppState::load(config_path.clone())
                    .map(|state| state.config.app_port)
                    .unwrap_or(FALLBACK_PORT);
                Url::parse(&format!("http://localhost:{}", port))?
            }
        };
        Ok(Self {
            remote,
            config_path,
        })
    }

    pub fn client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.remote)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;

    /// Run the command, returning what to print on success
    async fn execute(&self, ctx: &OpContext) -> Result<String, Self::Error>;
}

/// Declare a clap subcommand enum whose variants are [`Op`]s.
///
/// Expands to `Command`, a `CommandError` wrapping each variant's error,
///  and an [`Op`] impl that dispatches to the selected variant.
#[macro_export]
macro_rules! subcommands {
    ($($variant:ident => $op:ty),* $(,)?) => {
        #[derive(clap::Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($op),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum CommandError {
            $(
                #[error(transparent)]
                $variant(<$op as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Error = CommandError;

            async fn execute(
                &self,
                ctx: &$crate::cli::op::OpContext,
            ) -> Result<String, CommandError> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await.map_err(CommandError::$variant)
                        }
                    )*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_remote_wins() {
        let explicit = Url::parse("http://example.com:9999").unwrap();
        let ctx = OpContext::new(Some(explicit.clone()), None).unwrap();
        assert_eq!(ctx.remote, explicit);
    }

    #[test]
    fn test_remote_falls_back_to_default_port() {
        let ctx = OpContext::new(None, Some(PathBuf::from("/nonexistent"))).unwrap();
        assert_eq!(ctx.remote.as_str(), "http://localhost:5057/");
    }

    #[test]
    fn test_remote_uses_configured_port() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = sealbox_daemon::AppConfig::for_project(temp.path().to_path_buf());
        config.app_port = 6001;
        AppState::init(Some(temp.path().join("state")), config).unwrap();

        let ctx = OpContext::new(None, Some(temp.path().join("state"))).unwrap();
        assert_eq!(ctx.remote.port(), Some(6001));
        assert!(ctx.client().is_ok());
    }
}
