//! # Configuration Store
//!
//! Owns the live tree for one assignment and everything that touches it:
//! reconciliation on load, the custom topic side-table, persistence and
//! change notification.
//!
//! ## Lifecycle
//!
//! ```text
//! load(incoming) ──▶ reconcile ──▶ parse ──▶ layer side-table ──▶ persist ──▶ Replaced
//!                                                                   ▲
//! apply(Mutation) ──▶ validate ──▶ mutate tree ─────(topics only)───┘──▶ Mutated
//! ```
//!
//! All mutating methods take `&mut self`; the subscriber is owned by the
//! store and cannot call back into it.

use crate::duplicates::{DuplicateDetector, DuplicateMatch};
use crate::errors::EditorError;
use crate::mutations::{normalize_topics, Mutation, MutationError, MutationResult};
use crate::notifier::{ChangeEvent, ChangeNotifier};
use crate::reconcile::{self, ReconcileOutcome};
use crate::session_state::{self, SessionKeys};
use crate::usage::LemmaCount;
use expectations_common::SessionStore;
use expectations_parser::{
    parse_document, parse_str, serialize_document, serialize_rules, ClusterTopicSet, ClusterTopics,
    ConfigurationTree, ParseMode, RawDocument, RawRule,
};
use tracing::{debug, info, warn};

pub struct ConfigurationStore<S: SessionStore> {
    session: S,
    keys: SessionKeys,

    /// Incoming document of the last `load`, rebuilt from on `reset`
    original: Option<RawDocument>,

    tree: ConfigurationTree,
    topic_set: ClusterTopicSet,
    outcome: Option<ReconcileOutcome>,

    /// Increments on every load, reset and applied mutation
    version: u64,

    notifier: ChangeNotifier,
}

impl<S: SessionStore> ConfigurationStore<S> {
    /// Empty store persisting under keys scoped to `assignment_id`
    pub fn new(session: S, assignment_id: &str) -> Self {
        Self {
            session,
            keys: SessionKeys::new(assignment_id),
            original: None,
            tree: ConfigurationTree::default(),
            topic_set: ClusterTopicSet::new(),
            outcome: None,
            version: 0,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Install the change subscriber, replacing any previous one
    pub fn on_change(&mut self, callback: impl FnMut(ChangeEvent) + 'static) {
        self.notifier.subscribe(callback);
    }

    pub fn clear_subscriber(&mut self) {
        self.notifier.unsubscribe();
    }

    /// Reconcile `incoming` against the saved copy and rebuild the tree.
    ///
    /// Never fails: unreadable session values count as absent and
    /// persistence failures are logged.
    pub fn load(&mut self, incoming: RawDocument) -> &ConfigurationTree {
        let reconciliation = reconcile::reconcile(&incoming, self.saved_document());
        let outcome = reconciliation.outcome;

        self.rebuild(&reconciliation.document, outcome.mode(), true);
        self.original = Some(incoming);
        self.outcome = Some(outcome);

        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist loaded configuration");
        }

        info!(
            document = %self.tree.id,
            outcome = ?outcome,
            rules = self.tree.rule_count(),
            clusters = self.tree.cluster_count(),
            "Loaded configuration"
        );

        self.bump(ChangeEvent::Replaced);
        &self.tree
    }

    /// Decode `source` and load it
    pub fn load_str(&mut self, source: &str) -> Result<&ConfigurationTree, EditorError> {
        let incoming = parse_str(source)?;
        Ok(self.load(incoming))
    }

    /// Throw away local state and rebuild from the last incoming document
    /// with an empty side-table
    pub fn reset(&mut self) -> Result<&ConfigurationTree, EditorError> {
        let original = self.original.clone().ok_or(EditorError::NotLoaded)?;

        self.rebuild(&original, ParseMode::FreshTemplate, false);
        self.outcome = Some(ReconcileOutcome::NoSavedState);
        info!(document = %self.tree.id, "Reset configuration to server template");

        let persisted = session_state::clear(&mut self.session, &self.keys)
            .map_err(EditorError::from)
            .and_then(|_| self.persist());

        self.bump(ChangeEvent::Replaced);
        persisted?;
        Ok(&self.tree)
    }

    fn rebuild(&mut self, document: &RawDocument, mode: ParseMode, restore_side_table: bool) {
        let parsed = parse_document(document, mode);
        let mut tree = parsed.tree;

        let base = parsed
            .default_topics
            .unwrap_or_else(|| ClusterTopicSet::snapshot_of(&tree.rules));
        let stored = if restore_side_table {
            session_state::read_topic_set(&self.session, &self.keys)
        } else {
            None
        };

        let topic_set = session_state::layer_topic_sets(base, stored.as_ref());
        session_state::apply_topic_set(&mut tree, &topic_set);

        self.tree = tree;
        self.topic_set = topic_set;
    }

    /// Apply one mutation.
    ///
    /// The tree is left untouched when validation fails. A persistence
    /// failure is reported after the change has been applied and announced.
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        mutation.apply(&mut self.tree)?;
        debug!(mutation = mutation.name(), "Applied mutation");

        if let Mutation::SetClusterCustomTopics {
            rule_index,
            cluster_index,
            topics,
        } = &mutation
        {
            let lemma = self
                .tree
                .cluster(*rule_index, *cluster_index)
                .map(|cluster| cluster.topic.lemma.clone())
                .unwrap_or_default();
            // Terms of a cluster without a lemma live only in the document
            if !lemma.is_empty() {
                self.topic_set.overlay(&ClusterTopicSet::from_iter([ClusterTopics {
                    name: lemma,
                    custom_topics: topics.clone(),
                }]));
            }
        }

        let event = mutation.event();
        self.bump(event);

        if mutation.persists() {
            self.persist()?;
        }

        Ok(MutationResult {
            version: self.version,
            event,
        })
    }

    /// Replace a cluster's custom terms as given.
    ///
    /// `false` when the coordinates miss. Does not check for duplicates.
    pub fn set_cluster_custom_topics(
        &mut self,
        rule_index: usize,
        cluster_index: usize,
        topics: Vec<String>,
    ) -> bool {
        let mutation = Mutation::SetClusterCustomTopics {
            rule_index,
            cluster_index,
            topics,
        };

        match self.apply(mutation) {
            Ok(_) => true,
            Err(EditorError::Mutation(e)) => {
                debug!(error = %e, "Rejected custom topic update");
                false
            }
            Err(e) => {
                warn!(error = %e, "Custom topics updated but not persisted");
                true
            }
        }
    }

    /// Normalize `topics`, refuse any that another cluster already owns,
    /// then replace the cluster's custom terms.
    ///
    /// The target cluster's current custom terms are ignored by the
    /// duplicate check since they are being replaced.
    pub fn try_update_cluster_topics<T: AsRef<str>>(
        &mut self,
        rule_index: usize,
        cluster_index: usize,
        topics: &[T],
    ) -> Result<MutationResult, EditorError> {
        if self.tree.cluster(rule_index, cluster_index).is_none() {
            return Err(MutationError::ClusterNotFound {
                rule_index,
                cluster_index,
            }
            .into());
        }

        let topics = normalize_topics(topics);
        if let Some(hit) = DuplicateDetector::new(&self.tree)
            .replacing(rule_index, cluster_index)
            .find(&topics)
        {
            debug!(topic = %hit.topic, lemma = %hit.lemma, "Duplicate topic");
            return Err(MutationError::DuplicateTopic(hit).into());
        }

        self.apply(Mutation::SetClusterCustomTopics {
            rule_index,
            cluster_index,
            topics,
        })
    }

    /// Replace every usage count with the tagger's snapshot
    pub fn update_lemma_counts(&mut self, counts: &[LemmaCount]) -> u64 {
        let mutation = Mutation::UpdateLemmaCounts {
            counts: counts.to_vec(),
        };
        if let Err(e) = self.apply(mutation) {
            warn!(error = %e, "Failed to apply lemma counts");
        }
        self.version
    }

    pub fn check_duplicates<T: AsRef<str>>(&self, candidates: &[T]) -> Option<DuplicateMatch> {
        DuplicateDetector::new(&self.tree).find(candidates)
    }

    /// Whether `incoming` differs from the saved revision
    pub fn is_new_version(&self, incoming: &RawDocument) -> bool {
        reconcile::is_new_version(incoming, self.saved_document().as_ref())
    }

    /// The document currently persisted for this assignment
    pub fn saved_document(&self) -> Option<RawDocument> {
        session_state::read_document(&self.session, &self.keys)
    }

    /// Load the persisted copy as if the server had sent it.
    ///
    /// `None` when nothing readable is saved.
    pub fn resume(&mut self) -> Option<&ConfigurationTree> {
        let saved = self.saved_document()?;
        Some(self.load(saved))
    }

    /// Write the document and side-table to the session store
    pub fn persist(&mut self) -> Result<(), EditorError> {
        let document = serialize_document(&self.tree);
        session_state::write_document(&mut self.session, &self.keys, &document)?;
        session_state::write_topic_set(&mut self.session, &self.keys, &self.topic_set)?;
        Ok(())
    }

    fn bump(&mut self, event: ChangeEvent) {
        self.version += 1;
        self.notifier.notify(event);
    }

    pub fn is_ready(&self) -> bool {
        self.original.is_some()
    }

    pub fn tree(&self) -> &ConfigurationTree {
        &self.tree
    }

    /// How the last load resolved, `None` before the first load
    pub fn outcome(&self) -> Option<ReconcileOutcome> {
        self.outcome
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn topic_set(&self) -> &ClusterTopicSet {
        &self.topic_set
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Live rules in wire form
    pub fn get_json_rules(&self) -> Vec<RawRule> {
        serialize_rules(&self.tree.rules)
    }

    /// Full document with the live rules spliced in
    pub fn to_raw_document(&self) -> RawDocument {
        serialize_document(&self.tree)
    }

    pub fn session_store(&self) -> &S {
        &self.session
    }

    pub fn into_session_store(self) -> S {
        self.session
    }
}

impl<S: SessionStore> std::fmt::Debug for ConfigurationStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("keys", &self.keys)
            .field("document", &self.tree.id)
            .field("outcome", &self.outcome)
            .field("version", &self.version)
            .field("notifier", &self.notifier)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duplicates::MatchType;
    use expectations_common::MemorySessionStore;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn document() -> RawDocument {
        expectations_parser::parse_value(json!({
            "id": "doc-1",
            "info": { "name": "Stats", "version": "1" },
            "rules": {
                "name": "Report",
                "overview": "<p>Overview</p>",
                "rules": [{
                    "name": "Clarity",
                    "children": [{
                        "name": "Data Descriptors",
                        "topics": [{
                            "lemma": "Data Descriptors",
                            "pre_defined_topics": ["mean", "median"],
                            "custom_topics": []
                        }]
                    }]
                }]
            }
        }))
        .unwrap()
    }

    fn store() -> ConfigurationStore<MemorySessionStore> {
        ConfigurationStore::new(MemorySessionStore::new(), "a1")
    }

    #[test]
    fn test_load_persists_both_keys() {
        let mut store = store();
        store.load(document());

        assert!(store.is_ready());
        assert_eq!(store.outcome(), Some(ReconcileOutcome::NoSavedState));
        let session = store.session_store();
        assert!(session.get("a1_config").is_some());
        assert_eq!(
            session.get("a1_clusters").as_deref(),
            Some(r#"[{"name":"Data Descriptors","customTopics":[]}]"#)
        );
    }

    #[test]
    fn test_try_update_rejects_duplicates_without_mutating() {
        let mut store = store();
        store.load(document());
        let version = store.version();

        let err = store
            .try_update_cluster_topics(0, 0, &["  Median "])
            .unwrap_err();
        match err {
            EditorError::Mutation(MutationError::DuplicateTopic(hit)) => {
                assert_eq!(hit.topic, "Median");
                assert_eq!(hit.match_type, MatchType::Predefined);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.version(), version);
        assert!(store.tree().rules[0].children[0].topic.custom_terms.is_empty());
    }

    #[test]
    fn test_try_update_normalizes_and_persists() {
        let mut store = store();
        store.load(document());

        let result = store
            .try_update_cluster_topics(0, 0, &[" outlier", "Outlier", "", "mode"])
            .unwrap();
        assert_eq!(result.event, ChangeEvent::Mutated);
        assert_eq!(
            store.tree().rules[0].children[0].topic.custom_terms,
            vec!["outlier", "mode"]
        );
        assert_eq!(
            store.topic_set().get("Data Descriptors").unwrap().custom_topics,
            vec!["outlier", "mode"]
        );

        // Replacing its own custom terms is not a collision
        assert!(store.try_update_cluster_topics(0, 0, &["mode"]).is_ok());
    }

    #[test]
    fn test_try_update_missing_cluster() {
        let mut store = store();
        store.load(document());

        assert!(matches!(
            store.try_update_cluster_topics(3, 0, &["x"]),
            Err(EditorError::Mutation(MutationError::ClusterNotFound { .. }))
        ));
    }

    #[test]
    fn test_resume_restores_saved_copy() {
        let mut first = store();
        first.load(document());
        first.set_cluster_custom_topics(0, 0, vec!["outlier".into()]);

        let mut second = ConfigurationStore::new(first.into_session_store(), "a1");
        let tree = second.resume().unwrap();
        assert_eq!(tree.rules[0].children[0].topic.custom_terms, vec!["outlier"]);
        assert_eq!(second.outcome(), Some(ReconcileOutcome::LocalKept));

        assert!(store().resume().is_none());
    }

    #[test]
    fn test_reset_before_load() {
        let mut store = store();
        assert!(matches!(store.reset(), Err(EditorError::NotLoaded)));
    }

    #[test]
    fn test_events_in_order() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = store();
        let sink = events.clone();
        store.on_change(move |event| sink.borrow_mut().push(event));

        store.load(document());
        store.set_cluster_custom_topics(0, 0, vec!["outlier".into()]);
        store.set_cluster_custom_topics(0, 9, vec!["lost".into()]);
        store.update_lemma_counts(&[LemmaCount::new("Data Descriptors", 1)]);
        store.reset().unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                ChangeEvent::Replaced,
                ChangeEvent::Mutated,
                ChangeEvent::Mutated,
                ChangeEvent::Replaced
            ]
        );
        assert_eq!(store.version(), 4);
    }
}
