use clap::Parser;
use reqwest::Url;
use tokio::time::Duration;

use crate::error::{Result, SearchError};
use crate::searcher::{PagePolicy, Query};

pub const DEFAULT_ENDPOINT: &str = "https://grep.app/api/search";

/// grep.app search CLI: fetches every result page for a query and prints
/// the matched lines of each file as one JSON document.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Query grep.app page by page, merge the hits per repository and path, and print the collected lines as JSON."
)]
pub struct Args {
    /// Query string, required.
    #[clap(short, long)]
    pub query: Option<String>,

    /// Case sensitive search.
    #[clap(short, long = "case")]
    pub case_sensitive: bool,

    /// Use regex query. Cannot be used with -w.
    #[clap(short = 'r', long = "regex")]
    pub use_regex: bool,

    /// Search whole words. Cannot be used with -r.
    #[clap(short = 'w', long = "words")]
    pub whole_words: bool,

    /// Filter repository.
    #[clap(long = "frepo", default_value = "")]
    pub repo_filter: String,

    /// Filter path.
    #[clap(long = "fpath", default_value = "")]
    pub path_filter: String,

    /// Filter language (eg. Python,C,Java). Use comma for multiple values.
    #[clap(long = "flang", default_value = "")]
    pub lang_filter: String,

    /// JSON output. Required.
    #[clap(long = "json")]
    pub json_output: bool,

    /// Monochrome output: no color codes in matched lines.
    #[clap(short, long)]
    pub monochrome: bool,

    /// Maximum number of pages to fetch.
    #[clap(short = 'p', long, value_name = "NUM", default_value = "100", env = "GREPAPP_MAX_PAGES")]
    pub max_pages: u32,

    /// Pause before every request, in milliseconds.
    #[clap(long, value_name = "MS", default_value = "1000", env = "GREPAPP_DELAY_MS")]
    pub delay_ms: u64,

    /// Search API endpoint.
    #[clap(long, default_value = DEFAULT_ENDPOINT, env = "GREPAPP_ENDPOINT")]
    pub endpoint: String,

    /// Stop once a page adds no new files and the reported total is reached.
    #[clap(long)]
    pub stop_when_exhausted: bool,
}

/// Validated run settings derived from [`Args`].
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub endpoint: Url,
    pub query: Query,
    pub policy: PagePolicy,
    pub monochrome: bool,
}

impl Args {
    /// Check the arguments before anything touches the network.
    pub fn validate(&self) -> Result<SearchConfig> {
        let text = match &self.query {
            Some(q) if !q.trim().is_empty() => q.clone(),
            _ => return Err(SearchError::Config("Query string is required".into())),
        };

        if !self.json_output {
            return Err(SearchError::Config("JSON output is required".into()));
        }

        if self.max_pages == 0 {
            return Err(SearchError::Config("--max-pages must be at least 1".into()));
        }

        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            SearchError::Config(format!("invalid endpoint '{}': {}", self.endpoint, e))
        })?;

        Ok(SearchConfig {
            endpoint,
            query: Query {
                text,
                case_sensitive: self.case_sensitive,
                use_regex: self.use_regex,
                whole_words: self.whole_words,
                repo_filter: self.repo_filter.clone(),
                path_filter: self.path_filter.clone(),
                lang_filter: self.lang_filter.clone(),
            },
            policy: PagePolicy {
                page_cap: self.max_pages,
                delay: Duration::from_millis(self.delay_ms),
                stop_when_exhausted: self.stop_when_exhausted,
            },
            monochrome: self.monochrome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-backed defaults must not leak in from the caller's shell
    fn parse(argv: &[&str]) -> Args {
        for var in ["GREPAPP_MAX_PAGES", "GREPAPP_DELAY_MS", "GREPAPP_ENDPOINT"] {
            std::env::remove_var(var);
        }
        let mut full = vec!["grepapp-search"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&["-q", "needle", "--json"]);
        let config = args.validate().unwrap();

        assert_eq!(config.query.text, "needle");
        assert!(!config.query.case_sensitive);
        assert!(!config.query.use_regex);
        assert!(!config.query.whole_words);
        assert_eq!(config.policy, PagePolicy::default());
        assert_eq!(config.policy.page_cap, 100);
        assert_eq!(config.policy.delay, Duration::from_secs(1));
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert!(!config.monochrome);
    }

    #[test]
    fn flags_map_onto_query() {
        let args = parse(&[
            "-q", "fn main", "-c", "-r", "--frepo", "rust-lang/", "--fpath", "src/", "--flang",
            "Rust,C", "--json", "-m", "-p", "3", "--delay-ms", "0",
        ]);
        let config = args.validate().unwrap();

        assert!(config.query.case_sensitive);
        assert!(config.query.use_regex);
        assert_eq!(config.query.repo_filter, "rust-lang/");
        assert_eq!(config.query.path_filter, "src/");
        assert_eq!(config.query.lang_filter, "Rust,C");
        assert_eq!(config.policy.page_cap, 3);
        assert_eq!(config.policy.delay, Duration::ZERO);
        assert!(config.monochrome);
    }

    #[test]
    fn missing_query_is_config_error() {
        let err = parse(&["--json"]).validate().unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
        assert_eq!(err.to_string(), "Query string is required");

        let err = parse(&["-q", "  ", "--json"]).validate().unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn json_output_is_mandatory() {
        let err = parse(&["-q", "x"]).validate().unwrap_err();
        assert_eq!(err.to_string(), "JSON output is required");
    }

    #[test]
    fn zero_pages_rejected() {
        let err = parse(&["-q", "x", "--json", "-p", "0"]).validate().unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn bad_endpoint_rejected() {
        let err = parse(&["-q", "x", "--json", "--endpoint", "not a url"])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn regex_and_words_both_accepted() {
        let config = parse(&["-q", "x", "--json", "-r", "-w"]).validate().unwrap();
        assert!(config.query.use_regex && config.query.whole_words);
    }
}
