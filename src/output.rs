//! Output builders for one-shot CLI modes.
//!
//! Formats a settled search state as human-readable lines or JSON.

use crate::model::SearchState;
use anyhow::Result;

/// Pre-formatted lines for text output.
pub(crate) struct TextListing {
    pub lines: Vec<String>,
}

/// Build a text listing from a settled search state.
pub(crate) fn build_text_listing(state: &SearchState) -> TextListing {
    let mut lines = Vec::new();

    if state.cities.is_empty() {
        lines.push("No matching cities.".to_string());
        return TextListing { lines };
    }

    let name_width = state
        .cities
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0);
    let region_width = state
        .cities
        .iter()
        .map(|c| c.region.chars().count())
        .max()
        .unwrap_or(0);

    for city in &state.cities {
        lines.push(
            format!(
                "{:<name_width$}  {:<region_width$}  {}",
                city.name, city.region, city.country
            )
            .trim_end()
            .to_string(),
        );
    }

    let shown = state.cities.len() as u64;
    if state.total_results > shown {
        lines.push(format!(
            "Showing {} of {} matches.",
            shown, state.total_results
        ));
    }

    TextListing { lines }
}

/// Render a settled search state as a JSON object.
pub(crate) fn to_json(state: &SearchState) -> Result<String> {
    let out = serde_json::json!({
        "query": state.query.trim(),
        "totalResultsCount": state.total_results,
        "cities": state.cities,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}
