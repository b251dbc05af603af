//! Interactive single-screen mode: a query input, a result list, a loading
//! indicator, and an error line.
//!
//! The terminal loop runs on a dedicated thread to keep blocking I/O out of
//! the Tokio runtime; the search worker runs as an async task. The two sides
//! exchange `UiCommand` / `SearchEvent` over unbounded channels, and all
//! state mutation happens on the UI thread when events are applied.

use crate::cli::{build_config, Cli};
use crate::client::GeoNamesClient;
use crate::controller::{self, UiCommand};
use crate::model::{DisplayCity, SearchEvent};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

#[derive(Default)]
struct UiState {
    input: String,
    cities: Vec<DisplayCity>,
    total_results: u64,
    loading: bool,
    error: Option<String>,
}

pub async fn run(args: Cli) -> Result<()> {
    // Unbounded channels: the traffic is a handful of keystroke-driven
    // commands and one snapshot per search, so backpressure is a non-issue.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<SearchEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let client = GeoNamesClient::new(build_config(&args))?;

    // TUI runs in a dedicated thread; the worker owns the controller state.
    let ui_handle = std::thread::spawn(move || run_threaded(event_rx, cmd_tx));

    let res = controller::run_search_worker(client, cmd_rx, event_tx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    mut event_rx: UnboundedReceiver<SearchEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    let mut state = UiState::default();
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    terminal.draw(|f| draw(f.area(), f, &state)).ok();

    let res = loop {
        // Drain worker events without blocking so typing stays responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
        }

        // Poll input with a short timeout to keep the render loop live.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match (k.modifiers, k.code) {
                    (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                    (_, KeyCode::Enter) => {
                        let _ = cmd_tx.send(UiCommand::Search(state.input.clone()));
                    }
                    (_, KeyCode::Esc) => {
                        state.input.clear();
                    }
                    (_, KeyCode::Backspace) => {
                        state.input.pop();
                    }
                    (_, KeyCode::Char(c)) => {
                        state.input.push(c);
                    }
                    _ => {}
                }
            }
        }
    };

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn apply_event(state: &mut UiState, ev: SearchEvent) {
    match ev {
        SearchEvent::Started => {
            state.loading = true;
            state.error = None;
        }
        SearchEvent::Settled { state: snap } => {
            state.cities = snap.cities;
            state.total_results = snap.total_results;
            state.loading = snap.is_loading;
            state.error = snap.error;
        }
    }
}

fn draw(area: Rect, f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // query input
            Constraint::Length(1), // status line
            Constraint::Min(0),    // result list
        ])
        .split(area);

    let input = Paragraph::new(state.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Search city (Enter to search)"),
    );
    f.render_widget(input, chunks[0]);

    let status = if state.loading {
        Line::from(Span::styled(
            "Searching…",
            Style::default().fg(Color::Yellow),
        ))
    } else if let Some(err) = state.error.as_deref() {
        Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        ))
    } else if state.total_results > state.cities.len() as u64 {
        Line::from(format!(
            "Showing {} of {} matches.",
            state.cities.len(),
            state.total_results
        ))
    } else {
        Line::from(Span::styled(
            "Esc clears, Ctrl-C quits.",
            Style::default().fg(Color::Gray),
        ))
    };
    f.render_widget(Paragraph::new(status), chunks[1]);

    let items: Vec<ListItem> = state
        .cities
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    c.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("{}  {}", c.region, c.country),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Results"));
    f.render_widget(list, chunks[2]);
}
