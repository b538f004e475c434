//! Inspect command handler.
//!
//! Unlike the server, inspection fails loudly when an artifact cannot be read.

use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_vector::{faiss, IdentifierMap, VectorIndex};
use std::path::PathBuf;

/// Load the index artifacts and report what they contain
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Vector index file (overrides vector.index_path)
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Position to identifier CSV (overrides vector.mapping_path)
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl InspectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let index_path = self
            .index
            .clone()
            .unwrap_or_else(|| config.vector.index_path.clone());
        let mapping_path = self
            .mapping
            .clone()
            .unwrap_or_else(|| config.vector.mapping_path.clone());

        tracing::info!("Inspecting {:?} and {:?}", index_path, mapping_path);

        let (index_path, mapping_path, index, ids) = tokio::task::spawn_blocking(move || {
            let index = faiss::read_index(&index_path)?;
            let ids = IdentifierMap::from_csv_path(&mapping_path)?;
            Ok::<_, AppError>((index_path, mapping_path, index, ids))
        })
        .await
        .map_err(|e| AppError::internal(format!("Inspect task failed: {}", e)))??;

        let unmapped = (0..index.ntotal() as i64)
            .filter(|pos| ids.get(*pos).is_none())
            .count();

        if self.json {
            let output = serde_json::json!({
                "indexPath": index_path,
                "mappingPath": mapping_path,
                "dimension": index.dimension(),
                "ntotal": index.ntotal(),
                "metric": index.metric().to_string(),
                "mappedIds": ids.len(),
                "unmappedPositions": unmapped,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Index:      {}", index_path.display());
            println!("Mapping:    {}", mapping_path.display());
            println!("Dimension:  {}", index.dimension());
            println!("Vectors:    {}", index.ntotal());
            println!("Metric:     {}", index.metric());
            println!("Mapped IDs: {}", ids.len());
            if unmapped > 0 {
                println!(
                    "Warning: {} positions have no identifier and will be reported by position",
                    unmapped
                );
            }
        }

        Ok(())
    }
}
