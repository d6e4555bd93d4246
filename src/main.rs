pub mod agent;
pub mod app;
pub mod config;
pub mod conversation;
pub mod definitions;
pub mod event;
pub mod logging;
pub mod tui;
pub mod ui;

use std::env;

use anyhow::{Context, Result};
use app::App;
use config::ConsoleSettings;
use crossterm::event::{Event as CrosstermEvent, EventStream};
use event::Event;
use futures_util::StreamExt;
use log::{error, info};
use tui::{Tui, init, restore};
use ui::render;

#[tokio::main]
async fn main() -> Result<()> {
    let workspace_root = env::current_dir().context("無法取得目前目錄")?;
    let settings = ConsoleSettings::load(&workspace_root)?;
    logging::init(&workspace_root, &settings)?;
    info!("Starting amy-console in {}", workspace_root.display());

    let mut app = App::new(workspace_root, &settings);
    let mut tui = init()?;
    let result = run(&mut tui, &mut app).await;
    app.shutdown();
    restore()?;

    if let Err(err) = &result {
        error!("Console exited with error: {err:#}");
    }
    result
}

async fn run(tui: &mut Tui, app: &mut App) -> Result<()> {
    let mut stream = EventStream::new();
    let mut interval = tokio::time::interval(app.tick_rate());

    while !app.should_quit {
        tui.draw(|frame| render(frame, app))?;

        let event = tokio::select! {
            _ = interval.tick() => Event::Tick,
            maybe_event = stream.next() => {
                match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => Event::Key(key),
                    Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => return Err(err).context("讀取終端機事件失敗"),
                    None => break,
                }
            }
        };

        match event {
            Event::Tick => app.on_tick(),
            Event::Key(key) => app.handle_key(key).await,
            Event::Resize => {}
        }
    }

    info!("Shutting down");
    Ok(())
}
