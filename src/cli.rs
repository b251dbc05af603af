use crate::client::GeoNamesClient;
use crate::controller::SearchController;
use crate::model::SearchConfig;
use crate::output;
use anyhow::Result;
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "city-search",
    version,
    about = "City name lookup against the GeoNames search API"
)]
pub struct Cli {
    /// Partial city name to look up (omit to open the interactive screen)
    pub query: Option<String>,

    /// Base URL of the GeoNames lookup service
    #[arg(long, default_value = "http://api.geonames.org")]
    pub base_url: String,

    /// Maximum number of rows the server should return
    #[arg(long, default_value_t = 10)]
    pub max_rows: u32,

    /// GeoNames account name sent with every request
    #[arg(long, default_value = "keep_truckin")]
    pub username: String,

    /// Network timeout for a single lookup request
    #[arg(long, default_value = "10s")]
    pub timeout: humantime::Duration,

    /// Print results as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Print a plain text listing and exit (no TUI)
    #[arg(long)]
    pub text: bool,
}

/// Build a `SearchConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> SearchConfig {
    SearchConfig {
        base_url: args.base_url.clone(),
        max_rows: args.max_rows,
        username: args.username.clone(),
        timeout: Duration::from(args.timeout),
        user_agent: format!("city-search-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!(
            "--json and --text are mutually exclusive; pick one output mode."
        ));
    }

    if args.json || args.text || args.query.is_some() {
        return run_once(args).await;
    }

    #[cfg(feature = "tui")]
    {
        crate::tui::run(args).await
    }
    #[cfg(not(feature = "tui"))]
    {
        // Built without the interactive screen; a query is required.
        Err(anyhow::anyhow!(
            "a QUERY argument is required when built without TUI support"
        ))
    }
}

/// Run one search and print the settled result.
async fn run_once(args: Cli) -> Result<()> {
    let query = args.query.clone().unwrap_or_default();
    let client = GeoNamesClient::new(build_config(&args))?;
    let mut controller = SearchController::new(client);

    controller.update_query(&query);
    controller.run_search().await;

    let state = controller.state();
    if let Some(msg) = state.error.as_deref() {
        // The controller already folded the failure into a message; a
        // one-shot invocation still wants a non-zero exit.
        return Err(anyhow::anyhow!("{msg}"));
    }

    if args.json {
        println!("{}", output::to_json(state)?);
    } else {
        for line in output::build_text_listing(state).lines {
            println!("{line}");
        }
    }
    Ok(())
}
