/// Entity types that get cached. The name is part of every key, so renaming one
/// orphans whatever is already in the cache under the old name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Example,
}

impl EntityType {
    fn name(self) -> &'static str {
        match self {
            EntityType::Example => "example",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    ById(&'a str),
    Collection,
}

/// Maps (entity type, lookup) to a cache key.
///
/// Layout, kept stable for compatibility with entries already in the cache:
///   `<namespace>:<entity>:id:<id>` for single records
///   `<namespace>:<entity>s` for the full collection
///
/// A single-record key always has `:id:` right after the entity name, and a
/// collection key ends with the plural `s`, so the two families never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKeySchema {
    namespace: String,
}

impl CacheKeySchema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn key_for(&self, entity: EntityType, lookup: Lookup<'_>) -> String {
        match lookup {
            Lookup::ById(id) => format!("{}:{}:id:{}", self.namespace, entity.name(), id),
            Lookup::Collection => format!("{}:{}s", self.namespace, entity.name()),
        }
    }

    pub fn example_by_id(&self, id: &str) -> String {
        self.key_for(EntityType::Example, Lookup::ById(id))
    }

    pub fn examples(&self) -> String {
        self.key_for(EntityType::Example, Lookup::Collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_record_key_layout() {
        let keys = CacheKeySchema::new("example-store");
        assert_eq!(
            keys.example_by_id("exmp_0190a1b2c3d4"),
            "example-store:example:id:exmp_0190a1b2c3d4"
        );
    }

    #[test]
    fn test_collection_key_layout() {
        let keys = CacheKeySchema::new("example-store");
        assert_eq!(keys.examples(), "example-store:examples");
        assert_eq!(
            keys.key_for(EntityType::Example, Lookup::Collection),
            keys.examples()
        );
    }

    #[test]
    fn test_keys_are_deterministic() {
        let a = CacheKeySchema::new("ns");
        let b = CacheKeySchema::new("ns".to_string());
        assert_eq!(a.example_by_id("exmp_1"), b.example_by_id("exmp_1"));
        assert_eq!(a.examples(), b.examples());
    }

    #[test]
    fn test_distinct_inputs_never_share_a_key() {
        let keys = CacheKeySchema::new("ns");
        let candidates = [
            keys.examples(),
            keys.example_by_id(""),
            keys.example_by_id("s"),
            keys.example_by_id("exmp_1"),
            keys.example_by_id("exmp_2"),
            keys.example_by_id("exmp_1:extra"),
            CacheKeySchema::new("other").example_by_id("exmp_1"),
            CacheKeySchema::new("other").examples(),
        ];

        let mut unique = candidates.to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), candidates.len());
    }
}
