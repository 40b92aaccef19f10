use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_RESULTS: usize = 1000;

/// Everything needed to run one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    pub pattern: String,
    pub directory: String,
    pub file_type_globs: Vec<String>,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub include_hidden: bool,
    pub context_lines: u32,
    /// Cap on the number of distinct files returned.
    pub max_results: usize,
    /// Cap on matches reported inside a single file. Falls back to
    /// `max_results` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_matches_per_file: Option<usize>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            directory: String::new(),
            file_type_globs: Vec::new(),
            case_sensitive: false,
            whole_word: false,
            include_hidden: false,
            context_lines: 0,
            max_results: DEFAULT_MAX_RESULTS,
            max_matches_per_file: None,
        }
    }
}

impl SearchRequest {
    pub fn new(pattern: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Splits a comma-separated glob list such as `"*.rs, !target/**"`.
    pub fn parse_globs(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|glob| !glob.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn per_file_cap(&self) -> usize {
        self.max_matches_per_file.unwrap_or(self.max_results)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub line_number: u64,
    pub content: String,
    pub is_context_only: bool,
}

/// All lines reported for one file, in the order the tool emitted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file_path: String,
    pub matches: Vec<SearchMatch>,
}

impl SearchResult {
    /// Number of real matches, context lines excluded.
    pub fn match_count(&self) -> usize {
        self.matches.iter().filter(|m| !m.is_context_only).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub command_line: String,
    pub duration_ms: u64,
}

impl SearchOutcome {
    pub fn match_count(&self) -> usize {
        self.results.iter().map(SearchResult::match_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_globs_trims_and_drops_empty_entries() {
        assert_eq!(
            SearchRequest::parse_globs(" *.rs, ,!target/**,,*.toml "),
            vec!["*.rs", "!target/**", "*.toml"]
        );
        assert!(SearchRequest::parse_globs(" , ").is_empty());
    }

    #[test]
    fn per_file_cap_falls_back_to_max_results() {
        let mut request = SearchRequest::new("foo", "/tmp");
        assert_eq!(request.per_file_cap(), DEFAULT_MAX_RESULTS);

        request.max_matches_per_file = Some(5);
        assert_eq!(request.per_file_cap(), 5);
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"pattern":"foo","directory":"/src","wholeWord":true}"#)
                .unwrap();
        assert_eq!(request.pattern, "foo");
        assert!(request.whole_word);
        assert!(!request.case_sensitive);
        assert_eq!(request.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(request.max_matches_per_file, None);
    }

    #[test]
    fn match_count_ignores_context_lines() {
        let result = SearchResult {
            file_path: "/src/a.rs".to_string(),
            matches: vec![
                SearchMatch {
                    line_number: 1,
                    content: "before".to_string(),
                    is_context_only: true,
                },
                SearchMatch {
                    line_number: 2,
                    content: "foo".to_string(),
                    is_context_only: false,
                },
            ],
        };
        assert_eq!(result.match_count(), 1);
    }
}
