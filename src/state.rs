use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{Config, LlmConfig};
use crate::llm::{
    Embedder, LlmClient, MetadataExtractor, OutfitExplainer, OutfitJudge, PreferenceExtractor,
};
use crate::search::vector::VectorStore;
use crate::store::ItemStore;

/// Shared application state.
///
/// The remote capabilities are trait objects so tests can swap in
/// deterministic implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub items: Arc<ItemStore>,
    pub vectors: Arc<VectorStore>,
    pub llm_config: Arc<RwLock<LlmConfig>>,
    pub tagger: Arc<dyn MetadataExtractor>,
    pub judge: Arc<dyn OutfitJudge>,
    pub preferences: Arc<dyn PreferenceExtractor>,
    pub embedder: Arc<dyn Embedder>,
    pub explainer: Arc<dyn OutfitExplainer>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        // Ensure data directories exist
        std::fs::create_dir_all(config.images_dir())?;
        std::fs::create_dir_all(config.vector_dir())?;

        let items = ItemStore::open_or_create(&config.items_path())?;
        let vectors = VectorStore::open_or_create(&config.vector_dir())?;
        tracing::info!(
            "Loaded {} item(s), {} vector(s)",
            items.len(),
            vectors.entry_count()
        );

        // Per-call deadlines are enforced by LlmConfig::timeout_secs
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;
        let llm_config = Arc::new(RwLock::new(config.llm.clone()));
        let client = Arc::new(LlmClient::new(http, llm_config.clone()));

        Ok(Self {
            config,
            items: Arc::new(items),
            vectors: Arc::new(vectors),
            llm_config,
            tagger: client.clone(),
            judge: client.clone(),
            preferences: client.clone(),
            embedder: client.clone(),
            explainer: client,
        })
    }
}
