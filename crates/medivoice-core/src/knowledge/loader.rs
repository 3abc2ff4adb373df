use crate::error::Result;
use crate::knowledge::KnowledgeStore;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// One passage in the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub text: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SeedEntry {
    fn source(&self) -> Option<String> {
        self.metadata
            .get("source")
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Bulk-load a JSON array of `{text, metadata: {source}}` passages.
///
/// Returns the number of passages added. A missing file or a store that
/// already holds documents loads nothing, even when those documents were
/// embedded by a different model.
pub fn load_knowledge(path: impl AsRef<Path>, store: &KnowledgeStore) -> Result<usize> {
    let path = path.as_ref();
    if !path.exists() {
        log::warn!("Medical knowledge file not found: {}", path.display());
        return Ok(0);
    }

    let stored = store.stored_count()?;
    if stored > 0 {
        let indexed = store.count() as u64;
        if indexed < stored {
            log::warn!(
                "Medical knowledge already loaded ({} documents, {} usable with the current embedding model)",
                stored,
                indexed
            );
        } else {
            log::info!("Medical knowledge already loaded ({} documents)", stored);
        }
        return Ok(0);
    }

    let raw = std::fs::read_to_string(path)?;
    let entries: Vec<SeedEntry> = serde_json::from_str(&raw)?;

    let passages: Vec<(String, Option<String>)> = entries
        .into_iter()
        .filter(|e| !e.text.trim().is_empty())
        .map(|e| {
            let source = e.source();
            (e.text, source)
        })
        .collect();

    let added = store.add_documents(passages)?;
    log::info!("Loaded {} medical documents from {}", added, path.display());
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::knowledge::Retriever;
    use crate::storage::{RedbStorage, Storage};
    use crate::types::Embedding;
    use crate::vector::EmbeddingService;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct LengthEmbedder;

    impl EmbeddingService for LengthEmbedder {
        fn embed(&self, text: &str) -> Result<Embedding> {
            Ok(vec![1.0, text.len() as f32 / 100.0])
        }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }
        fn dimension(&self) -> usize {
            2
        }
        fn model_name(&self) -> &str {
            "length-test"
        }
    }

    struct WideEmbedder;

    impl EmbeddingService for WideEmbedder {
        fn embed(&self, _text: &str) -> Result<Embedding> {
            Ok(vec![0.5, 0.5, 0.5])
        }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
            texts.iter().map(|t| self.embed(t)).collect()
        }
        fn dimension(&self) -> usize {
            3
        }
        fn model_name(&self) -> &str {
            "wide-test"
        }
    }

    fn store_in(dir: &TempDir) -> KnowledgeStore {
        store_with(dir, Arc::new(LengthEmbedder))
    }

    fn store_with(dir: &TempDir, embeddings: Arc<dyn EmbeddingService>) -> KnowledgeStore {
        let storage: Arc<dyn Storage> =
            Arc::new(RedbStorage::open(dir.path().join("kb.redb")).unwrap());
        KnowledgeStore::open(storage, embeddings).unwrap()
    }

    const SEED: &str = r#"[
        {"text": "Malaria symptoms include fever and chills.", "metadata": {"source": "Ghana Health Service"}},
        {"text": "Drink oral rehydration salts for diarrhoea."},
        {"text": "   "}
    ]"#;

    #[test]
    fn test_missing_file_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let loaded = load_knowledge(dir.path().join("absent.json"), &store).unwrap();
        assert_eq!(loaded, 0);
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_loads_once() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("medical_knowledge.json");
        std::fs::write(&seed, SEED).unwrap();
        let store = store_in(&dir);

        assert_eq!(load_knowledge(&seed, &store).unwrap(), 2);
        assert_eq!(load_knowledge(&seed, &store).unwrap(), 0);
        assert_eq!(store.count(), 2);

        let context = store.search("fever", 2);
        assert!(context.contains("[Ghana Health Service]"));
        assert!(context.contains("[Medical Database]"));
    }

    #[test]
    fn test_model_change_does_not_reload_seed() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("medical_knowledge.json");
        std::fs::write(&seed, SEED).unwrap();

        {
            let store = store_with(&dir, Arc::new(WideEmbedder));
            assert_eq!(load_knowledge(&seed, &store).unwrap(), 2);
        }

        let store = store_in(&dir);
        assert_eq!(store.count(), 0);
        assert_eq!(load_knowledge(&seed, &store).unwrap(), 0);
        assert_eq!(store.stored_count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("bad.json");
        std::fs::write(&seed, "{not json").unwrap();
        let store = store_in(&dir);
        assert!(load_knowledge(&seed, &store).is_err());
    }
}
