//! Terminal front end: owns the terminal, the browser and the event loop.

mod input;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use file_encrypter::{AppController, AppEvent, Config, FileBrowser, Operations};

use input::{Action, map_key};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the UI until the user quits.
///
/// Blocks the calling thread. Must be called inside a tokio runtime context, which
/// the background operations are spawned on.
pub fn run(config: Config) -> Result<()> {
    let mut browser = FileBrowser::new(&config)
        .with_context(|| format!("opening {}", config.start_dir.display()))?;

    // Set up terminal
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    // Panic hook: restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
        original_hook(info);
    }));

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let operations = Operations::new(tx.clone());
    let mut app = AppController::new(&config);
    operations.run_all(app.init());

    let result = event_loop(&mut terminal, &mut app, &mut browser, &operations, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode().context("disable raw mode")?;
    io::stdout()
        .execute(LeaveAlternateScreen)
        .context("leave alternate screen")?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppController,
    browser: &mut FileBrowser,
    operations: &Operations,
    tx: &mpsc::UnboundedSender<AppEvent>,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app, browser))?;

        // Drain everything the background tasks and the keyboard produced
        while let Ok(event) = rx.try_recv() {
            let refresh = matches!(
                &event,
                AppEvent::OperationSucceeded { outcome, .. } if outcome.modified()
            );
            operations.run_all(app.update(event));
            if refresh && let Err(e) = browser.refresh() {
                log::warn!("refreshing {}: {e}", browser.dir().display());
            }
        }

        if app.should_quit() {
            break;
        }

        if event::poll(POLL_INTERVAL).context("event poll")?
            && let Event::Key(key) = event::read().context("event read")?
            && let Some(action) = map_key(key, app.state())
        {
            let outcome = match action {
                Action::App(event) => {
                    let _ = tx.send(event);
                    Ok(())
                }
                Action::Up => {
                    browser.move_up();
                    Ok(())
                }
                Action::Down => {
                    browser.move_down();
                    Ok(())
                }
                Action::Parent => browser.go_parent(),
                Action::Open => browser.open().map(|selection| {
                    if let Some(selection) = selection {
                        let _ = tx.send(selection.into());
                    }
                }),
            };
            if let Err(e) = outcome {
                let _ = tx.send(AppEvent::OperationFailed {
                    op: None,
                    error: e.into(),
                });
            }
        }
    }
    Ok(())
}
