use serde::{Deserialize, Serialize};

/// One entry in a search tool's result list. `position` is 1-based and is
/// renumbered after filtering so the caller never sees a gap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub position: u32,
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Drops any result whose title, snippet or URL contains a disallowed
/// keyword (case-insensitive substring match) and renumbers what remains.
pub fn filter(results: Vec<SearchResult>, deny_list: &[String]) -> Vec<SearchResult> {
    let deny_list: Vec<String> = deny_list.iter().map(|word| word.to_lowercase()).collect();

    results
        .into_iter()
        .filter(|result| !matches_any(result, &deny_list))
        .enumerate()
        .map(|(index, mut result)| {
            result.position = index as u32 + 1;
            result
        })
        .collect()
}

fn matches_any(result: &SearchResult, deny_list: &[String]) -> bool {
    let haystack = format!("{} {} {}", result.title, result.snippet, result.url).to_lowercase();
    deny_list.iter().any(|word| haystack.contains(word.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: u32, title: &str) -> SearchResult {
        SearchResult { position, title: title.to_string(), snippet: String::new(), url: "https://example.com".to_string() }
    }

    #[test]
    fn keeps_results_with_no_deny_match() {
        let results = vec![result(1, "rust programming"), result(2, "async patterns")];
        let filtered = filter(results.clone(), &["gambling".to_string()]);
        assert_eq!(filtered, results);
    }

    #[test]
    fn drops_matching_results_and_renumbers() {
        let results = vec![result(1, "casino bonus"), result(2, "rust programming"), result(3, "async patterns")];
        let filtered = filter(results, &["casino".to_string()]);

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].position, 1);
        assert_eq!(filtered[0].title, "rust programming");
        assert_eq!(filtered[1].position, 2);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let results = vec![result(1, "CASINO bonus")];
        let filtered = filter(results, &["casino".to_string()]);
        assert!(filtered.is_empty());
    }
}
