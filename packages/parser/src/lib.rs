//! # Expectations Parser
//!
//! Wire model, lenient decoding and the rule → cluster → topic tree of an
//! expectations document.
//!
//! ```text
//! JSON text ──parse_str──▶ RawDocument ──parse_document──▶ ConfigurationTree
//!                              ▲                                 │
//!                              └─────── serialize_document ◀─────┘
//! ```

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod query;
pub mod raw;
pub mod serde_helpers;
pub mod serializer;
pub mod topic_set;

pub use ast::{Cluster, ConfigurationTree, Rule, Topic};
pub use error::{ParseError, ParseResult};
pub use id_generator::{get_document_seed, IdGenerator};
pub use parser::{parse, parse_document, parse_str, parse_value, ParseMode, ParsedDocument, Parser};
pub use query::LemmaTopics;
pub use raw::{DocumentInfo, RawDocument, RawRule, RawRuleSet, RawTopic};
pub use serializer::{serialize_document, serialize_rules};
pub use topic_set::{ClusterTopicSet, ClusterTopics};
