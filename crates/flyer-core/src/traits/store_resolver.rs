/// Store-name normalization and fuzzy lookup strategy.
///
/// Template and accuracy registries key on normalized store names; putting
/// the matching behind a trait lets the substring strategy be swapped for
/// a trie or fuzzy index later without touching callers.
pub trait StoreResolver: Send + Sync {
    /// Canonical registry key for a raw store name.
    fn normalize(&self, store: &str) -> String;

    /// Resolve a raw name against known keys. Exact match wins, then
    /// substring containment in either direction.
    fn resolve(&self, store: &str, known: &[String]) -> Option<String>;
}
