//! # Expectations Editor
//!
//! Stateful engine over a parsed expectations document.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: JSON → RawDocument → tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: ConfigurationStore                  │
//! │  - Reconcile server and saved documents     │
//! │  - Layer the custom topic side-table        │
//! │  - Apply mutations with validation          │
//! │  - Persist through a SessionStore           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: CLI, wasm bindings                    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Local edits win for the same document id**: a saved copy is only
//!    replaced when the server sends a different document
//! 2. **Custom topics follow the lemma**: the side-table survives a
//!    replaced document
//! 3. **Usage counts are derived**: every batch is a full snapshot and is
//!    never persisted
//!
//! ## Usage
//!
//! ```rust,ignore
//! use expectations_common::MemorySessionStore;
//! use expectations_editor::{ConfigurationStore, LemmaCount};
//!
//! let mut store = ConfigurationStore::new(MemorySessionStore::new(), "assignment-42");
//! store.load_str(&json)?;
//!
//! if store.check_duplicates(&["outlier"]).is_none() {
//!     store.set_cluster_custom_topics(0, 0, vec!["outlier".into()]);
//! }
//!
//! store.update_lemma_counts(&[LemmaCount::new("Data Descriptors", 7)]);
//! ```

pub mod duplicates;
pub mod errors;
pub mod mutations;
pub mod notifier;
pub mod reconcile;
pub mod session_state;
pub mod store;
pub mod usage;

pub use duplicates::{check_duplicates, DuplicateDetector, DuplicateMatch, MatchType};
pub use errors::EditorError;
pub use mutations::{normalize_topics, Mutation, MutationError, MutationResult};
pub use notifier::{ChangeEvent, ChangeNotifier};
pub use reconcile::{is_new_version, reconcile, ReconcileOutcome, Reconciliation};
pub use session_state::SessionKeys;
pub use store::ConfigurationStore;
pub use usage::{update_lemma_counts, LemmaCount};
