use clap::Args;

use sealbox_daemon::http_server::api::client::ApiError;
use sealbox_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

fn presence(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "MISSING"
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = std::convert::Infallible;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<String, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.state_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!(
                    "  jobs/:        {}",
                    presence(state.jobs_dir.is_dir())
                ));
                lines.push(format!(
                    "  tool:         {} ({})",
                    presence(state.config.tool_path.is_file()),
                    state.config.tool_path.display()
                ));
                lines.push(format!("  app_port:     {}", state.config.app_port));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Check the daemon
        lines.push(String::new());
        lines.push(format!("Daemon ({}):", ctx.remote));

        let client = match ctx.client() {
            Ok(client) => client,
            Err(e) => {
                lines.push(format!("  error: {}", e));
                return Ok(lines.join("\n"));
            }
        };
        for check in ["livez", "readyz"] {
            let status = match client.fetch(&format!("/_status/{}", check)).await {
                Ok(_) => "OK".to_string(),
                Err(ApiError::Reqwest(_)) => "NOT REACHABLE".to_string(),
                Err(e) => format!("UNHEALTHY ({})", e),
            };
            lines.push(format!("  {:<7} {}", format!("{}:", check), status));
        }

        Ok(lines.join("\n"))
    }
}
