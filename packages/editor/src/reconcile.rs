//! # Reconciliation
//!
//! Decides which of the incoming (server) and saved (local) documents a
//! load builds from.
//!
//! | saved state        | winner   | mode          |
//! |--------------------|----------|---------------|
//! | none or unreadable | incoming | fresh         |
//! | different id       | incoming | fresh         |
//! | same id            | saved    | restored      |
//!
//! `is_new_version` compares revision metadata only and never changes
//! the outcome.

use expectations_parser::{ParseMode, RawDocument};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconcileOutcome {
    /// Nothing saved; the incoming document was adopted
    NoSavedState,
    /// Saved document belonged to another id; the incoming one replaced it
    ServerReplaced,
    /// Saved document shares the incoming id; local edits win
    LocalKept,
}

impl ReconcileOutcome {
    pub fn mode(self) -> ParseMode {
        match self {
            ReconcileOutcome::NoSavedState | ReconcileOutcome::ServerReplaced => {
                ParseMode::FreshTemplate
            }
            ReconcileOutcome::LocalKept => ParseMode::Restored,
        }
    }

    pub fn is_fresh(self) -> bool {
        self.mode() == ParseMode::FreshTemplate
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Document to build the tree from
    pub document: RawDocument,
    pub outcome: ReconcileOutcome,
}

pub fn reconcile(incoming: &RawDocument, saved: Option<RawDocument>) -> Reconciliation {
    match saved {
        None => Reconciliation {
            document: incoming.clone(),
            outcome: ReconcileOutcome::NoSavedState,
        },
        Some(saved) if saved.id != incoming.id => Reconciliation {
            document: incoming.clone(),
            outcome: ReconcileOutcome::ServerReplaced,
        },
        Some(saved) => Reconciliation {
            document: saved,
            outcome: ReconcileOutcome::LocalKept,
        },
    }
}

/// True when nothing is saved or the revision metadata differs
pub fn is_new_version(incoming: &RawDocument, saved: Option<&RawDocument>) -> bool {
    match saved {
        None => true,
        Some(saved) => !incoming.info.same_revision(&saved.info),
    }
}
