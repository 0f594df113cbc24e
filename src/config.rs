use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where uploaded images, the item store and vector data live
    pub data_dir: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// LLM provider configuration
    pub llm: LlmConfig,
    /// Items kept per slot before the cartesian product is taken
    pub candidates_per_slot: usize,
    /// Maximum in-flight outfit scoring calls
    pub max_concurrent_scoring: usize,
    /// Number of hits returned by style search
    pub search_limit: usize,
    /// Maximum upload size in MB
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai" (any OpenAI-compatible server) or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Vision-capable chat model used for tagging, scoring and preferences
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Per-call timeout in seconds (capped at 300)
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            bind_addr: "127.0.0.1:8000".to_string(),
            llm: LlmConfig::default(),
            candidates_per_slot: 3,
            max_concurrent_scoring: 4,
            search_limit: 20,
            max_upload_mb: 20,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "http://127.0.0.1:8034".to_string(),
            chat_model: "Qwen3-VL-4B-Instruct-GGUF:Q4_K_M".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("STYLIST_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("STYLIST_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("STYLIST_CANDIDATES_PER_SLOT") {
            if let Ok(v) = val.parse::<usize>() {
                config.candidates_per_slot = v.max(1);
            }
        }
        if let Ok(val) = std::env::var("STYLIST_MAX_CONCURRENT_SCORING") {
            if let Ok(v) = val.parse::<usize>() {
                config.max_concurrent_scoring = v.max(1);
            }
        }
        if let Ok(val) = std::env::var("STYLIST_SEARCH_LIMIT") {
            if let Ok(v) = val.parse() {
                config.search_limit = v;
            }
        }
        if let Ok(val) = std::env::var("STYLIST_MAX_UPLOAD_MB") {
            if let Ok(v) = val.parse() {
                config.max_upload_mb = v;
            }
        }

        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(val) = std::env::var("LLM_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.llm.timeout_secs = v.clamp(1, 300);
            }
        }

        config
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join("images")
    }

    pub fn items_path(&self) -> PathBuf {
        self.data_dir.join("items.json")
    }

    pub fn vector_dir(&self) -> PathBuf {
        self.data_dir.join("vectors")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_model_server() {
        let config = Config::default();
        assert_eq!(config.candidates_per_slot, 3);
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.base_url, "http://127.0.0.1:8034");
    }

    #[test]
    fn test_derived_paths() {
        let config = Config {
            data_dir: PathBuf::from("/tmp/wardrobe"),
            ..Config::default()
        };
        assert_eq!(config.images_dir(), PathBuf::from("/tmp/wardrobe/images"));
        assert_eq!(config.items_path(), PathBuf::from("/tmp/wardrobe/items.json"));
        assert_eq!(config.vector_dir(), PathBuf::from("/tmp/wardrobe/vectors"));
    }
}
