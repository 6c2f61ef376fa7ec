//! Serve command handler.

use crate::server;
use clap::Args;
use lectern_core::{config::AppConfig, AppResult};
use lectern_engine::{AppContext, Orchestrator};

/// Start the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (default from config: 127.0.0.1:3000)
    #[arg(short, long, env = "LECTERN_BIND_ADDR")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let bind_addr = self
            .bind
            .clone()
            .unwrap_or_else(|| config.server.bind_addr.clone());

        // Refuses to start without a usable index.
        let ctx = AppContext::from_config(config.clone())?;
        server::serve(Orchestrator::new(ctx), &bind_addr).await
    }
}
