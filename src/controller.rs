//! Query controller.
//!
//! Owns the screen-session state and is the sole recovery point for lookup
//! failures: every failed search becomes a user-visible error line and a
//! cleared result list, never a crash.

use crate::client::{CityRecord, GeoNamesClient};
use crate::model::{DisplayCity, SearchEvent, SearchState};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Fallback when a failure renders to an empty message.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Commands emitted by UI layers to drive searches.
#[derive(Debug, Clone)]
pub enum UiCommand {
    /// Replace the query text and run a search with it.
    Search(String),
    Quit,
}

pub struct SearchController {
    client: GeoNamesClient,
    state: SearchState,
}

impl SearchController {
    pub fn new(client: GeoNamesClient) -> Self {
        Self {
            client,
            state: SearchState::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Store the query text verbatim. No validation, no side effect.
    pub fn update_query(&mut self, text: &str) {
        self.state.query = text.to_string();
    }

    /// Run one search against the current query.
    ///
    /// A query that is empty after trimming clears the result list and the
    /// reported total, then returns without touching the network, the
    /// loading flag, or the error line. Otherwise exactly one request is issued and the state settles
    /// once: either a wholesale-replaced city list with no error, or an
    /// error message with an empty list. Taking `&mut self` means searches
    /// through one controller cannot overlap.
    pub async fn run_search(&mut self) {
        let query = self.state.query.trim().to_string();
        if query.is_empty() {
            self.state.cities.clear();
            self.state.total_results = 0;
            return;
        }

        self.state.is_loading = true;
        self.state.error = None;

        match self.client.search(&query).await {
            Ok(resp) => {
                self.state.cities = resp.geonames.into_iter().map(to_display_city).collect();
                self.state.total_results = resp.total_results_count;
                self.state.is_loading = false;
            }
            Err(e) => {
                self.state.error = Some(error_message(&e));
                self.state.cities.clear();
                self.state.total_results = 0;
                self.state.is_loading = false;
            }
        }
    }
}

fn to_display_city(rec: CityRecord) -> DisplayCity {
    DisplayCity {
        name: rec.name.to_uppercase(),
        region: rec.admin_name1,
        country: rec.country_name,
    }
}

fn error_message(err: &anyhow::Error) -> String {
    // `{:#}` flattens the context chain into one line.
    let msg = format!("{err:#}");
    if msg.trim().is_empty() {
        GENERIC_ERROR.to_string()
    } else {
        msg
    }
}

/// Drive a controller from UI commands and emit state snapshots back.
///
/// Commands are handled one at a time, so searches submitted while one is in
/// flight queue up and apply in order; the final state always reflects one
/// complete response (last-write-wins by queue order). There is no
/// cancellation of an in-flight request.
pub async fn run_search_worker(
    client: GeoNamesClient,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
    event_tx: UnboundedSender<SearchEvent>,
) -> Result<()> {
    let mut controller = SearchController::new(client);
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UiCommand::Search(text) => {
                controller.update_query(&text);
                if !text.trim().is_empty() {
                    let _ = event_tx.send(SearchEvent::Started);
                }
                controller.run_search().await;
                let _ = event_tx.send(SearchEvent::Settled {
                    state: controller.state().clone(),
                });
            }
            UiCommand::Quit => break,
        }
    }
    Ok(())
}
