use std::time::Duration;

use mini_moka::sync::Cache;

/// Operator-controlled tool descriptions that override a tool's static
/// `description`. Falls back to the static text on a cache miss rather
/// than failing the request.
pub struct DescriptionCache {
    cache: Cache<String, String>,
}

impl DescriptionCache {
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().max_capacity(1_000).time_to_idle(Duration::from_secs(60 * 60)).build(),
        }
    }

    pub fn set_override(&self, tool_name: &str, description: String) {
        self.cache.insert(tool_name.to_string(), description);
    }

    pub fn clear_override(&self, tool_name: &str) {
        self.cache.invalidate(tool_name);
    }

    /// Resolves a tool's effective description: the operator override if
    /// one is cached, otherwise `static_description` unchanged.
    pub fn resolve<'a>(&self, tool_name: &str, static_description: &'a str) -> std::borrow::Cow<'a, str> {
        match self.cache.get(tool_name) {
            Some(overridden) => std::borrow::Cow::Owned(overridden),
            None => std::borrow::Cow::Borrowed(static_description),
        }
    }
}

impl Default for DescriptionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_static_description_on_miss() {
        let cache = DescriptionCache::new();
        assert_eq!(cache.resolve("search", "Searches the web"), "Searches the web");
    }

    #[test]
    fn override_takes_precedence_once_set() {
        let cache = DescriptionCache::new();
        cache.set_override("search", "Finds things, operator-tuned wording".to_string());
        assert_eq!(cache.resolve("search", "Searches the web"), "Finds things, operator-tuned wording");
    }

    #[test]
    fn cleared_override_reverts_to_static() {
        let cache = DescriptionCache::new();
        cache.set_override("search", "custom".to_string());
        cache.clear_override("search");
        assert_eq!(cache.resolve("search", "Searches the web"), "Searches the web");
    }
}
