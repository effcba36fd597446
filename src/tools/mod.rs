//! Search providers and the aggregating registry.
//!
//! Four providers ship by default: `duckduckgo` (general web), `wikipedia`
//! (encyclopedia), `arxiv` (academic papers), and `web_scraper` (pages whose
//! URLs appear in the query). Each carries its own retry budget; the
//! registry fans a query out to all of them and concatenates whatever
//! survives, isolating per-provider failures.

/// Provider trait, retry policy, and aggregation.
pub mod registry;

/// arXiv paper search.
pub mod arxiv;
/// DuckDuckGo web search (via daedra).
pub mod duckduckgo;
/// Query-URL page fetching (via daedra).
pub mod scrape;
/// Wikipedia article search.
pub mod wikipedia;

pub use registry::{RetryPolicy, SearchProvider, SearchRegistry};
