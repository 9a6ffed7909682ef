use crc32fast::Hasher;

/// Short, stable seed derived from a server document id
pub fn get_document_seed(document_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(document_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ids for rule and cluster nodes.
///
/// Nodes are numbered in document order, so parsing the same document
/// twice hands out the same ids.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(document_id: &str) -> Self {
        Self {
            seed: get_document_seed(document_id),
            count: 0,
        }
    }

    /// Next id; the counter advances even when the caller keeps a wire id
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_stable() {
        assert_eq!(get_document_seed("doc-1"), get_document_seed("doc-1"));
        assert_ne!(get_document_seed("doc-1"), get_document_seed("doc-2"));
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new("doc-1");

        let id1 = gen.new_id();
        let id2 = gen.new_id();

        assert!(id1.ends_with("-1"));
        assert!(id2.ends_with("-2"));
        assert!(id1.starts_with(gen.seed()));
    }
}
