use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deforest_watch::app::App;
use deforest_watch::clock::SystemClock;
use deforest_watch::config::Args;
use deforest_watch::map::load_basemap;
use deforest_watch::rng::{RandomSource, SeededRandom};
use deforest_watch::ui;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, &args);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file: the terminal belongs to the UI
fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("creating log file {}", args.log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

/// Handle mouse events for panning, zooming, and map controls
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        // Scroll wheel zooms towards the pointer on whichever map it is over
        MouseEventKind::ScrollUp => app.zoom_at(mouse.column, mouse.row, true),
        MouseEventKind::ScrollDown => app.zoom_at(mouse.column, mouse.row, false),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) => app.click(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, args: &Args) -> Result<()> {
    let basemap = load_basemap(args.data_dir.as_deref());
    if let Err(e) = &basemap {
        warn!(error = %e, "basemap unavailable");
    }

    let rng: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(SeededRandom::from_seed(seed)),
        None => Box::new(SeededRandom::from_entropy()),
    };

    let size = terminal.size()?;
    let mut app = App::new(
        size.width,
        size.height,
        basemap,
        args.interval(),
        rng,
        Box::new(SystemClock),
    );
    info!(seed = ?args.seed, interval_secs = args.interval_secs, "dashboard started");

    if args.start_monitoring {
        app.start_monitoring();
    }

    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                    // Map controls
                    KeyCode::Char(c @ ('d' | 'r')) => {
                        app.control_key(c);
                    }

                    KeyCode::Char('m') => app.toggle_monitoring(),
                    KeyCode::Char('u') => app.update_stats(),
                    KeyCode::Char('c') => app.cycle_country(),
                    KeyCode::Char('t') => app.cycle_time_range(),
                    KeyCode::Tab => app.toggle_focus(),
                    KeyCode::Char('p') => app.cycle_popup(),
                    KeyCode::Char('x') => app.close_popup(),

                    // Pan with hjkl or arrow keys
                    KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                    KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                    KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                    KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

                    // Zoom
                    KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                    _ => {}
                },
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    app.stop_monitoring();
    info!(cycles = app.history.len(), "dashboard stopped");
    Ok(())
}
