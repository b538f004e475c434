//! Serve command handler.

use clap::Args;
use medrag_core::{config::AppConfig, AppResult};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Run the vector search server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Vector index file (overrides vector.index_path)
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Position to identifier CSV (overrides vector.mapping_path)
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Address to listen on (overrides server.listen)
    #[arg(long)]
    pub listen: Option<SocketAddr>,
}

impl ServeCommand {
    pub async fn execute(self, mut config: AppConfig) -> AppResult<()> {
        if let Some(index) = self.index {
            config.vector.index_path = index;
        }
        if let Some(mapping) = self.mapping {
            config.vector.mapping_path = mapping;
        }
        if let Some(listen) = self.listen {
            config.server.listen = listen;
        }

        tracing::info!(
            index = ?config.vector.index_path,
            mapping = ?config.vector.mapping_path,
            "Starting vector search server"
        );

        medrag_server::serve(&config).await
    }
}
