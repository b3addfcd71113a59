//! Per-session glossary and preference storage
//!
//! Each session key resolves to its own [`SessionHandle`]. Handles for the same
//! key share one async mutex, so operations on a session are serialized while
//! different sessions proceed independently. Durability lives behind the
//! [`DocumentStore`] seam; the registry only coordinates access.

use async_trait::async_trait;
use lingua_common::Result;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::trace;

/// Ordered list of caller-defined glossary entries
pub type Glossary = Vec<Value>;

/// Opaque preference mapping
pub type PreferenceSet = Map<String, Value>;

/// Weak entries are swept once the registry grows past this many keys
const PRUNE_FLOOR: usize = 1024;

/// The two documents each session owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Document {
    Glossary,
    Prefs,
}

impl Document {
    pub fn as_str(&self) -> &'static str {
        match self {
            Document::Glossary => "glossary",
            Document::Prefs => "prefs",
        }
    }
}

/// Durable storage for session documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a stored document, `None` when nothing was ever written
    async fn load(&self, session_id: &str, document: Document) -> Result<Option<Value>>;

    /// Replace a stored document
    async fn save(&self, session_id: &str, document: Document, value: &Value) -> Result<()>;
}

#[derive(Debug, Default)]
struct SessionSlot {
    lock: tokio::sync::Mutex<()>,
}

struct RegistryInner {
    slots: HashMap<String, Weak<SessionSlot>>,
    prune_at: usize,
}

/// Keyed registry of independently synchronized session handles
pub struct SessionRegistry {
    store: Arc<dyn DocumentStore>,
    inner: Mutex<RegistryInner>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(RegistryInner {
                slots: HashMap::new(),
                prune_at: PRUNE_FLOOR,
            }),
        }
    }

    /// Resolve the handle for a session key
    ///
    /// Never touches storage; sessions come into existence on first write.
    pub fn resolve(&self, session_id: &str) -> SessionHandle {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        let slot = match inner.slots.get(session_id).and_then(Weak::upgrade) {
            Some(slot) => slot,
            None => {
                if inner.slots.len() >= inner.prune_at {
                    inner.slots.retain(|_, slot| slot.strong_count() > 0);
                    inner.prune_at = (inner.slots.len() * 2).max(PRUNE_FLOOR);
                    trace!(live = inner.slots.len(), "Pruned idle session slots");
                }
                let slot = Arc::new(SessionSlot::default());
                inner.slots.insert(session_id.to_string(), Arc::downgrade(&slot));
                slot
            }
        };

        SessionHandle {
            session_id: session_id.to_string(),
            slot,
            store: Arc::clone(&self.store),
        }
    }

    /// Number of keys currently tracked (live or awaiting prune)
    pub fn tracked_sessions(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).slots.len()
    }
}

/// Access to one session's documents
pub struct SessionHandle {
    session_id: String,
    slot: Arc<SessionSlot>,
    store: Arc<dyn DocumentStore>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Stored glossary, or an empty list if none was written
    pub async fn get_glossary(&self) -> Result<Glossary> {
        let _guard = self.slot.lock.lock().await;
        let stored = self.store.load(&self.session_id, Document::Glossary).await?;
        Ok(normalize_glossary(stored))
    }

    /// Replace the glossary; non-list input is stored as an empty list
    pub async fn put_glossary(&self, value: Value) -> Result<()> {
        let glossary = Value::Array(normalize_glossary(Some(value)));
        let _guard = self.slot.lock.lock().await;
        self.store.save(&self.session_id, Document::Glossary, &glossary).await
    }

    /// Stored preferences, or an empty mapping if none were written
    pub async fn get_prefs(&self) -> Result<PreferenceSet> {
        let _guard = self.slot.lock.lock().await;
        let stored = self.store.load(&self.session_id, Document::Prefs).await?;
        Ok(normalize_prefs(stored))
    }

    /// Replace preferences; non-mapping input is stored as an empty mapping
    pub async fn put_prefs(&self, value: Value) -> Result<()> {
        let prefs = Value::Object(normalize_prefs(Some(value)));
        let _guard = self.slot.lock.lock().await;
        self.store.save(&self.session_id, Document::Prefs, &prefs).await
    }
}

fn normalize_glossary(value: Option<Value>) -> Glossary {
    match value {
        Some(Value::Array(entries)) => entries,
        _ => Vec::new(),
    }
}

fn normalize_prefs(value: Option<Value>) -> PreferenceSet {
    match value {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// In-memory store that records the peak number of overlapping calls per session
    #[derive(Default)]
    struct RecordingStore {
        docs: Mutex<HashMap<(String, Document), Value>>,
        in_flight: Mutex<HashMap<String, usize>>,
        peak: AtomicUsize,
    }

    impl RecordingStore {
        async fn enter(&self, session_id: &str) {
            {
                let mut in_flight = self.in_flight.lock().unwrap();
                let count = in_flight.entry(session_id.to_string()).or_insert(0);
                *count += 1;
                self.peak.fetch_max(*count, Ordering::SeqCst);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            *self.in_flight.lock().unwrap().get_mut(session_id).unwrap() -= 1;
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn load(&self, session_id: &str, document: Document) -> Result<Option<Value>> {
            self.enter(session_id).await;
            Ok(self.docs.lock().unwrap().get(&(session_id.to_string(), document)).cloned())
        }

        async fn save(&self, session_id: &str, document: Document, value: &Value) -> Result<()> {
            self.enter(session_id).await;
            self.docs
                .lock()
                .unwrap()
                .insert((session_id.to_string(), document), value.clone());
            Ok(())
        }
    }

    fn registry() -> (Arc<RecordingStore>, SessionRegistry) {
        let store = Arc::new(RecordingStore::default());
        let registry = SessionRegistry::new(store.clone());
        (store, registry)
    }

    #[tokio::test]
    async fn test_fresh_session_defaults() {
        let (_, registry) = registry();
        let session = registry.resolve("never-written");

        assert_eq!(session.get_glossary().await.unwrap(), Vec::<Value>::new());
        assert_eq!(session.get_prefs().await.unwrap(), Map::new());
    }

    #[tokio::test]
    async fn test_glossary_round_trip_preserves_order() {
        let (_, registry) = registry();
        let session = registry.resolve("s1");
        let glossary = json!(["synergy", {"term": "circle back", "note": "meeting-speak"}, "leverage"]);

        session.put_glossary(glossary.clone()).await.unwrap();
        session.put_glossary(glossary.clone()).await.unwrap();

        assert_eq!(Value::Array(session.get_glossary().await.unwrap()), glossary);
    }

    #[tokio::test]
    async fn test_non_list_glossary_normalized_to_empty() {
        let (store, registry) = registry();
        let session = registry.resolve("s1");

        session.put_glossary(json!(["x"])).await.unwrap();
        session.put_glossary(json!({"not": "a list"})).await.unwrap();

        assert!(session.get_glossary().await.unwrap().is_empty());
        let stored = store.docs.lock().unwrap().get(&("s1".to_string(), Document::Glossary)).cloned();
        assert_eq!(stored, Some(json!([])));
    }

    #[tokio::test]
    async fn test_prefs_round_trip_and_normalization() {
        let (_, registry) = registry();
        let session = registry.resolve("s1");
        let prefs = json!({"audience": "Executives", "nested": {"tone": ["Formal"]}});

        session.put_prefs(prefs.clone()).await.unwrap();
        assert_eq!(Value::Object(session.get_prefs().await.unwrap()), prefs);

        session.put_prefs(json!("scalar")).await.unwrap();
        assert!(session.get_prefs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let (_, registry) = registry();

        registry.resolve("a").put_glossary(json!(["alpha"])).await.unwrap();
        registry.resolve("b").put_prefs(json!({"k": 1})).await.unwrap();

        assert_eq!(registry.resolve("a").get_glossary().await.unwrap(), vec![json!("alpha")]);
        assert!(registry.resolve("a").get_prefs().await.unwrap().is_empty());
        assert!(registry.resolve("b").get_glossary().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_operations_on_one_session_are_serialized() {
        let (store, registry) = registry();
        let registry = Arc::new(registry);

        let mut tasks = Vec::new();
        for i in 0..16 {
            let registry = Arc::clone(&registry);
            tasks.push(tokio::spawn(async move {
                let session = registry.resolve("shared");
                session.put_glossary(json!([i])).await.unwrap();
                session.get_glossary().await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_same_key_shares_slot_while_held() {
        let (_, registry) = registry();
        let first = registry.resolve("k");
        let second = registry.resolve("k");

        assert!(Arc::ptr_eq(&first.slot, &second.slot));
        assert_eq!(registry.tracked_sessions(), 1);
    }

    #[tokio::test]
    async fn test_idle_slots_are_pruned() {
        let (_, registry) = registry();
        for i in 0..(PRUNE_FLOOR + 10) {
            drop(registry.resolve(&format!("session-{i}")));
        }

        assert!(registry.tracked_sessions() <= PRUNE_FLOOR);
    }
}
