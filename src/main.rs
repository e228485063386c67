use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{env, error::Error, io, sync::Mutex, time::Duration};
use tracing_subscriber::EnvFilter;

mod app;

use app::api::HttpTaskRepository;
use app::theme::ThemeService;
use app::ui::{run_app, App};

const THEME_FILE: &str = "taskdeck-theme.json";
const LOG_FILE: &str = "taskdeck.log";

pub fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    init_logging()?;

    // The tasks resource URL is the one piece of required configuration;
    // it is injected into the repository here and nowhere else.
    let base_url = env::var("TASKDECK_API_URL").map_err(|_| {
        "TASKDECK_API_URL must point at the tasks resource, \
         e.g. https://api.example.com/api/v1/tasks"
    })?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut theme = ThemeService::load(THEME_FILE);
    theme.subscribe(|mode| tracing::info!(?mode, "theme changed"));

    let repo = HttpTaskRepository::new(base_url);
    let mut app = App::new(repo, theme);
    app.dashboard.load(&app.repo);

    let tick_rate = Duration::from_millis(250);
    let res = run_app(&mut terminal, &mut app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }
    Ok(())
}

// Logs go to a file so they never corrupt the alternate screen.
fn init_logging() -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
