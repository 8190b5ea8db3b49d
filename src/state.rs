use std::sync::Arc;

use tokio::sync::RwLock;

use crate::services::{catalog::CatalogRepository, recommendations::RecommendationService};

/// Shared application state
///
/// The catalog repository sits behind one RwLock: mutations take the write
/// lock for the whole read-modify-persist step, which is what keeps minted
/// ids unique under concurrent callers. The recommendation service is
/// optional; the catalog works fully without it.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RwLock<CatalogRepository>>,
    pub recommender: Option<Arc<RecommendationService>>,
}

impl AppState {
    pub fn new(catalog: CatalogRepository, recommender: Option<RecommendationService>) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
            recommender: recommender.map(Arc::new),
        }
    }
}
