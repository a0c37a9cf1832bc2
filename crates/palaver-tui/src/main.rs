mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use palaver_core::{parse_query, Config, KvStore, SessionEvent, SqliteKvStore};

use app::{next_session_event, App};
use tui::{AppEvent, EventHandler, Tui};

/// Whatever woke the run loop.
enum Wake {
    Input(AppEvent),
    Session(SessionEvent),
    InputClosed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::new(), Some(e)),
    };

    let data_dir = config.data_dir()?;
    logging::init(&data_dir, &config.log_level)?;
    if let Some(e) = config_error {
        warn!(error = ?e, "falling back to default config");
    }

    let db_path = data_dir.join("palaver.db");
    let store: Arc<dyn KvStore> = Arc::new(
        SqliteKvStore::open(&db_path).with_context(|| format!("opening {}", db_path.display()))?,
    );
    info!(data_dir = %data_dir.display(), "starting palaver");

    let mut app = App::new(&config, store, &data_dir);

    // Optional page query, e.g. `palaver 'id=2&user=Bhavani&image=pic1.png.jpg'`
    if let Some(query) = std::env::args().nth(1) {
        app.open_chat(&parse_query(&query));
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;

    app.close_chat();
    tui::restore()?;
    info!("palaver exited");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let wake = tokio::select! {
            event = events.next() => match event {
                Some(event) => Wake::Input(event),
                None => Wake::InputClosed,
            },
            Some(event) = next_session_event(&mut app.session_rx) => Wake::Session(event),
        };

        match wake {
            Wake::Input(event) => handler::handle_event(app, event),
            Wake::Session(event) => app.dispatch(event),
            Wake::InputClosed => break,
        }
    }

    Ok(())
}
