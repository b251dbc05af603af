use serde::Serialize;
use std::time::Duration;

/// Fixed client configuration; built once from CLI arguments and reused for
/// every request.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub max_rows: u32,
    pub username: String,
    pub timeout: Duration,
    pub user_agent: String,
}

/// UI-facing projection of a raw lookup record. Holds no identity beyond its
/// fields; the whole list is rebuilt on every successful search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCity {
    pub name: String,
    pub region: String,
    pub country: String,
}

/// Screen-session state owned by the controller. Mutated only by
/// `update_query` and `run_search`; discarded when the session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub cities: Vec<DisplayCity>,
    /// Server-reported total, which may exceed `cities.len()` when the
    /// server truncates at `maxRows`. Zero until a search succeeds.
    pub total_results: u64,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Events emitted by the search worker and consumed by UI layers.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A query was accepted and a request is in flight.
    Started,
    /// The search settled; the snapshot fully replaces the UI's view of the
    /// result list, error line, and loading flag.
    Settled { state: SearchState },
}
