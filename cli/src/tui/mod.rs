//! Interactive terminal UI.
//!
//! Terminal events and session results are consumed by one `select!` loop;
//! every event goes through the session driver and the screen is redrawn
//! from the resulting state.

mod ui;

use std::io;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use porty_core::{
    CommandProbe, ConfigStore, Key, RegistryBuilder, SessionController, SessionDriver,
    SessionEvent, SessionSettings, SystemMetadata, SystemTerminator,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info, warn};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

pub async fn run(
    settings: SessionSettings,
    registry: RegistryBuilder<CommandProbe, SystemMetadata>,
    store: Option<ConfigStore>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, settings, registry, store.as_ref()).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    settings: SessionSettings,
    registry: RegistryBuilder<CommandProbe, SystemMetadata>,
    store: Option<&ConfigStore>,
) -> Result<()> {
    let mut driver = SessionDriver::new(
        SessionController::new(settings),
        registry,
        SystemTerminator::new(),
    );
    let size = terminal.size()?;
    driver.dispatch(SessionEvent::Resize { rows: size.height });
    driver.start();
    info!("Interactive session started");

    let mut scope = driver.state().include_all_ports;
    let mut events = EventStream::new();
    loop {
        terminal.draw(|frame| ui::draw(frame, driver.state()))?;

        let running = tokio::select! {
            Some(event) = driver.recv() => driver.dispatch(event),
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => match translate(event) {
                    Some(event) => driver.dispatch(event),
                    None => true,
                },
                Some(Err(e)) => return Err(e.into()),
                None => false,
            },
        };
        if !running {
            break;
        }

        let include_all = driver.state().include_all_ports;
        if include_all != scope {
            scope = include_all;
            if let Some(store) = store {
                remember_port_scope(store, include_all).await;
            }
        }
    }

    debug!("Interactive session finished");
    Ok(())
}

/// Persist the dev/all toggle as the startup default for the next session.
async fn remember_port_scope(store: &ConfigStore, include_all: bool) {
    if let Err(e) = store
        .update(|config| config.show_all_ports = include_all)
        .await
    {
        warn!(error = %e, "Could not save port scope");
    }
}

/// Map a terminal event onto a session event.
fn translate(event: Event) -> Option<SessionEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key).map(SessionEvent::Input),
        Event::Resize(_, rows) => Some(SessionEvent::Resize { rows }),
        _ => None,
    }
}

fn map_key(key: KeyEvent) -> Option<Key> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Key::CtrlC),
        KeyCode::Char(c) => Some(Key::Char(c)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        _ => None,
    }
}
