use std::path::Path;

use mood_core::api::HistoryResponse;
use mood_core::db;

/// Every stored record, in the store's natural row order.
pub async fn load_history(store: &Path) -> anyhow::Result<HistoryResponse> {
    let sentiments = db::list_sentiments(store).await?;
    tracing::debug!(count = sentiments.len(), "Loaded sentiment history");
    Ok(HistoryResponse { sentiments })
}
