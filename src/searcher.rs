use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Deserializer};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

use crate::args::SearchConfig;
use crate::error::{Result, SearchError};
use crate::hits::ResultSet;
use crate::snippet;

/// What to search for and how to filter it.
///
/// `use_regex` and `whole_words` are not meant to be combined; if both are
/// set only the regex parameter is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub case_sensitive: bool,
    pub use_regex: bool,
    pub whole_words: bool,
    pub repo_filter: String,
    pub path_filter: String,
    pub lang_filter: String,
}

/// Pagination limits for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePolicy {
    pub page_cap: u32,
    pub delay: Duration,
    pub stop_when_exhausted: bool,
}

impl Default for PagePolicy {
    fn default() -> Self {
        PagePolicy {
            page_cap: 100,
            delay: Duration::from_secs(1),
            stop_when_exhausted: false,
        }
    }
}

/// One fetched page: its hits and the total the service reports.
#[derive(Debug, Default)]
pub struct Page {
    pub hits: ResultSet,
    pub total_count: u64,
}

// Fields sent as `null` read the same as missing ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    #[serde(deserialize_with = "null_as_default")]
    facets: Facets,
    #[serde(deserialize_with = "null_as_default")]
    hits: HitList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Facets {
    #[serde(deserialize_with = "null_as_default")]
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HitList {
    #[serde(deserialize_with = "null_as_default")]
    hits: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHit {
    #[serde(deserialize_with = "null_as_default")]
    repo: RawField,
    #[serde(deserialize_with = "null_as_default")]
    path: RawField,
    #[serde(deserialize_with = "null_as_default")]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawField {
    #[serde(deserialize_with = "null_as_default")]
    raw: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Content {
    #[serde(deserialize_with = "null_as_default")]
    snippet: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct GrepSearcher {
    client: Client,
    endpoint: Url,
    policy: PagePolicy,
    monochrome: bool,
}

impl GrepSearcher {
    /// Create a searcher for a validated configuration
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("grepapp-search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GrepSearcher {
            client,
            endpoint: config.endpoint.clone(),
            policy: config.policy.clone(),
            monochrome: config.monochrome,
        })
    }

    /// Fetch pages 1..=cap one after another and merge them.
    ///
    /// Any failed page aborts the run; nothing collected so far is returned.
    pub async fn run(&self, query: &Query) -> Result<ResultSet> {
        if query.use_regex && query.whole_words {
            warn!("Both regex and whole-word mode set; whole-word mode is ignored");
        }

        // Create a progress bar over the page cap
        let pb = ProgressBar::new(self.policy.page_cap.into());
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        // The accumulator lives here and only grows between pages
        let mut results = ResultSet::new();
        let mut page: u32 = 1;

        while page != 0 && page <= self.policy.page_cap {
            // Fixed pause before every request
            sleep(self.policy.delay).await;
            pb.set_message(format!("Searching '{}' - page {}", query.text, page));

            // Any failed page ends the whole run
            let fetched = match self.fetch_page(page, query).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    pb.abandon_with_message(format!("Failed on page {}", page));
                    error!("Error searching '{}' page {}: {}", query.text, page, e);
                    return Err(e);
                }
            };

            // Merge this page and count the files it introduced
            let before = results.len();
            let page_hits = fetched.hits.len();
            results.merge(fetched.hits);
            let added = results.len() - before;

            info!(
                "Merged {} hits ({} new) for '{}' page {} of {} total",
                page_hits, added, query.text, page, fetched.total_count
            );
            pb.inc(1);

            // Opt-in early stop once nothing new arrives
            if self.policy.stop_when_exhausted
                && added == 0
                && results.len() as u64 >= fetched.total_count
            {
                info!("No new hits for '{}' after page {}, stopping", query.text, page);
                break;
            }

            // 0 ends the loop if the counter would overflow
            page = page.checked_add(1).unwrap_or(0);
        }

        // Clear the progress bar before the JSON is printed
        pb.finish_and_clear();
        info!(
            "Collected {} files and {} lines for '{}'",
            results.len(),
            results.line_count(),
            query.text
        );
        Ok(results)
    }

    /// Fetch and parse a single results page.
    pub async fn fetch_page(&self, page: u32, query: &Query) -> Result<Page> {
        let url = self.build_url(page, query);

        debug!("Requesting URL: {}", url);
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        // Anything but 200 is fatal
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SearchError::Status { status, url });
        }

        let body: SearchResponse = response.json().await.map_err(|source| {
            if source.is_decode() {
                SearchError::Decode {
                    url: url.clone(),
                    source,
                }
            } else {
                SearchError::Network(source)
            }
        })?;

        // Register every file first, then add its highlighted lines
        let mut hits = ResultSet::new();
        for raw in &body.hits.hits {
            let repo = &raw.repo.raw;
            let path = &raw.path.raw;
            hits.add_hit(repo, path, "", "");
            for line in snippet::highlighted_lines(&raw.content.snippet, self.monochrome) {
                hits.add_hit(repo, path, &line, &line);
            }
        }

        Ok(Page {
            hits,
            total_count: body.facets.count,
        })
    }

    /// Build the request URL for `page`.
    ///
    /// Optional parameters are only added when enabled or non-empty.
    pub fn build_url(&self, page: u32, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", &query.text)
                .append_pair("page", &page.to_string());

            if query.use_regex {
                pairs.append_pair("regexp", "true");
            } else if query.whole_words {
                pairs.append_pair("words", "true");
            }

            if query.case_sensitive {
                pairs.append_pair("case", "true");
            }

            for (name, value) in [
                ("f.repo.pattern", &query.repo_filter),
                ("f.path.pattern", &query.path_filter),
                ("f.lang", &query.lang_filter),
            ] {
                if !value.is_empty() {
                    pairs.append_pair(name, value);
                }
            }
        }
        url
    }
}
