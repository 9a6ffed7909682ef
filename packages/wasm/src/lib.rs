//! Browser bindings for the expectations engine.
//!
//! Structured values cross the boundary as JSON strings. The engine keeps
//! its session state in memory; the host mirrors `sessionEntries()` into
//! `sessionStorage` and passes it back to the constructor on the next page.

use expectations_common::MemorySessionStore;
use expectations_editor::{
    ChangeEvent, ConfigurationStore, DuplicateMatch, EditorError, LemmaCount, MutationError,
};
use expectations_parser::Cluster;
use serde::Serialize;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| js_error(format!("Serialization error: {}", e)))
}

/// Negative indices from JS never resolve
fn index(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Result of `tryUpdateClusterTopics`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum UpdateOutcome {
    Applied { version: u64 },
    Duplicate { duplicate: DuplicateMatch },
    NotFound,
}

#[wasm_bindgen]
pub struct ExpectationsEngine {
    store: ConfigurationStore<MemorySessionStore>,
    last_event: Rc<Cell<Option<ChangeEvent>>>,
}

#[wasm_bindgen]
impl ExpectationsEngine {
    /// `session_json` is a previous `sessionEntries()` snapshot, if any
    #[wasm_bindgen(constructor)]
    pub fn new(assignment_id: &str, session_json: Option<String>) -> Result<ExpectationsEngine, JsValue> {
        let entries: HashMap<String, String> = match session_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| js_error(format!("Invalid session entries: {}", e)))?,
            None => HashMap::new(),
        };

        let mut store = ConfigurationStore::new(MemorySessionStore::from_entries(entries), assignment_id);
        let last_event = Rc::new(Cell::new(None));
        let sink = last_event.clone();
        store.on_change(move |event| sink.set(Some(event)));

        Ok(Self { store, last_event })
    }

    /// Load a server document. Returns the reconcile outcome.
    pub fn load(&mut self, json: &str) -> Result<String, JsValue> {
        self.store
            .load_str(json)
            .map_err(js_error)?;
        to_json(&self.store.outcome())
    }

    /// Load the saved copy; `false` when nothing is saved
    pub fn resume(&mut self) -> bool {
        self.store.resume().is_some()
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.store.reset().map(|_| ()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = isNewVersion)]
    pub fn is_new_version(&self, json: &str) -> Result<bool, JsValue> {
        let incoming = expectations_parser::parse_str(json).map_err(js_error)?;
        Ok(self.store.is_new_version(&incoming))
    }

    /// First collision as JSON, `undefined` when there is none
    #[wasm_bindgen(js_name = checkDuplicates)]
    pub fn check_duplicates(&self, candidates_json: &str) -> Result<Option<String>, JsValue> {
        let candidates: Vec<String> = serde_json::from_str(candidates_json).map_err(js_error)?;
        self.store
            .check_duplicates(&candidates)
            .map(|hit| to_json(&hit))
            .transpose()
    }

    #[wasm_bindgen(js_name = setClusterCustomTopics)]
    pub fn set_cluster_custom_topics(
        &mut self,
        rule_index: i32,
        cluster_index: i32,
        topics_json: &str,
    ) -> Result<bool, JsValue> {
        let topics: Vec<String> = serde_json::from_str(topics_json).map_err(js_error)?;
        Ok(match (index(rule_index), index(cluster_index)) {
            (Some(r), Some(c)) => self.store.set_cluster_custom_topics(r, c, topics),
            _ => false,
        })
    }

    /// `{"status": "applied" | "duplicate" | "notFound", ...}`
    #[wasm_bindgen(js_name = tryUpdateClusterTopics)]
    pub fn try_update_cluster_topics(
        &mut self,
        rule_index: i32,
        cluster_index: i32,
        topics_json: &str,
    ) -> Result<String, JsValue> {
        let topics: Vec<String> = serde_json::from_str(topics_json).map_err(js_error)?;
        let (r, c) = match (index(rule_index), index(cluster_index)) {
            (Some(r), Some(c)) => (r, c),
            _ => return to_json(&UpdateOutcome::NotFound),
        };

        let outcome = match self.store.try_update_cluster_topics(r, c, &topics) {
            Ok(result) => UpdateOutcome::Applied {
                version: result.version,
            },
            Err(EditorError::Mutation(MutationError::DuplicateTopic(duplicate))) => {
                UpdateOutcome::Duplicate { duplicate }
            }
            Err(EditorError::Mutation(MutationError::ClusterNotFound { .. })) => UpdateOutcome::NotFound,
            Err(e) => return Err(js_error(e)),
        };
        to_json(&outcome)
    }

    /// `counts_json`: `[{"lemma": ..., "count": ...}]`
    #[wasm_bindgen(js_name = updateLemmaCounts)]
    pub fn update_lemma_counts(&mut self, counts_json: &str) -> Result<(), JsValue> {
        let counts: Vec<LemmaCount> = serde_json::from_str(counts_json).map_err(js_error)?;
        self.store.update_lemma_counts(&counts);
        Ok(())
    }

    #[wasm_bindgen(js_name = isReady)]
    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn version(&self) -> f64 {
        self.store.version() as f64
    }

    /// Kind of the most recent change (`{"kind": "replaced"}`), if any
    #[wasm_bindgen(js_name = lastEvent)]
    pub fn last_event(&self) -> Option<String> {
        self.last_event
            .get()
            .and_then(|event| serde_json::to_string(&event).ok())
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.store.tree().name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn overview(&self) -> String {
        self.store.tree().overview.clone()
    }

    #[wasm_bindgen(js_name = documentInfo)]
    pub fn document_info(&self) -> Result<String, JsValue> {
        to_json(&self.store.tree().info)
    }

    #[wasm_bindgen(js_name = ruleCount)]
    pub fn rule_count(&self) -> usize {
        self.store.tree().rule_count()
    }

    #[wasm_bindgen(js_name = clusterCount)]
    pub fn cluster_count(&self) -> usize {
        self.store.tree().cluster_count()
    }

    #[wasm_bindgen(js_name = getJsonRules)]
    pub fn get_json_rules(&self) -> Result<String, JsValue> {
        to_json(&self.store.get_json_rules())
    }

    #[wasm_bindgen(js_name = toRawDocument)]
    pub fn to_raw_document(&self) -> Result<String, JsValue> {
        to_json(&self.store.to_raw_document())
    }

    pub fn rule(&self, rule_index: i32) -> Option<String> {
        let rule = self.store.tree().rule(index(rule_index)?)?;
        serde_json::to_string(rule).ok()
    }

    pub fn cluster(&self, rule_index: i32, cluster_index: i32) -> Option<String> {
        let cluster = self.store.tree().cluster(index(rule_index)?, index(cluster_index)?)?;
        cluster_json(cluster)
    }

    #[wasm_bindgen(js_name = ruleById)]
    pub fn rule_by_id(&self, id: &str) -> Option<String> {
        serde_json::to_string(self.store.tree().rule_by_id(id)?).ok()
    }

    #[wasm_bindgen(js_name = clusterById)]
    pub fn cluster_by_id(&self, id: &str) -> Option<String> {
        let (_, _, cluster) = self.store.tree().cluster_by_id(id)?;
        cluster_json(cluster)
    }

    #[wasm_bindgen(js_name = clusterByFlatIndex)]
    pub fn cluster_by_flat_index(&self, flat_index: i32) -> Option<String> {
        cluster_json(self.store.tree().cluster_by_flat_index(index(flat_index)?)?)
    }

    /// Distinct lemmas as a JSON array
    pub fn lemmas(&self) -> Result<String, JsValue> {
        to_json(&self.store.tree().lemmas())
    }

    #[wasm_bindgen(js_name = predefinedTopicCount)]
    pub fn predefined_topic_count(&self, rule_index: i32, cluster_index: i32) -> Option<usize> {
        self.store
            .tree()
            .predefined_topic_count(index(rule_index)?, index(cluster_index)?)
    }

    #[wasm_bindgen(js_name = customTopicCount)]
    pub fn custom_topic_count(&self, rule_index: i32, cluster_index: i32) -> Option<usize> {
        self.store
            .tree()
            .custom_topic_count(index(rule_index)?, index(cluster_index)?)
    }

    #[wasm_bindgen(js_name = clusterTopicText)]
    pub fn cluster_topic_text(&self, rule_index: i32, cluster_index: i32) -> Option<String> {
        self.store
            .tree()
            .cluster_topic_text(index(rule_index)?, index(cluster_index)?)
    }

    #[wasm_bindgen(js_name = allTopicsText)]
    pub fn all_topics_text(&self) -> String {
        self.store.tree().all_topics_text()
    }

    #[wasm_bindgen(js_name = topicsByLemma)]
    pub fn topics_by_lemma(&self) -> Result<String, JsValue> {
        to_json(&self.store.tree().topics_by_lemma())
    }

    /// Every session key and value, for mirroring into `sessionStorage`
    #[wasm_bindgen(js_name = sessionEntries)]
    pub fn session_entries(&self) -> Result<String, JsValue> {
        to_json(self.store.session_store().entries())
    }
}

fn cluster_json(cluster: &Cluster) -> Option<String> {
    serde_json::to_string(cluster).ok()
}
