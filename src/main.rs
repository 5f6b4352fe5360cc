mod render;

use std::io::{self, Stdout};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use pacman_autopilot::{ActorId, CancelToken, Dir, Game, Level, Scheduler, Session, Settings};

use crate::render::Renderer;

const SCHEDULER_FRAME: Duration = Duration::from_millis(5);

fn main() -> io::Result<()> {
    let settings = Settings::from_env();
    let _guard = setup_logging(&settings.log_dir)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        tracing::error!(%err, "game aborted");
    }
    result
}

/// The terminal is in raw mode, so logs go to a file only.
fn setup_logging(dir: &Path) -> io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, "pacman.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    tracing::info!(log = %dir.join("pacman.log").display(), "logging initialized");
    Ok(guard)
}

fn run(stdout: &mut Stdout, settings: &Settings) -> io::Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let game = Game::new(&mut rng, settings.width, settings.height).map_err(io::Error::other)?;
    let ghosts = game.board.ghosts().len();
    let session = Arc::new(Mutex::new(Session::new(game, rng)));
    let token = CancelToken::new();

    let mut scheduler = Scheduler::new();
    scheduler.every(ActorId::Player, settings.tick);
    for idx in 0..ghosts {
        scheduler.every(ActorId::Ghost(idx), settings.ghost_tick);
    }
    let worker = {
        let session = Arc::clone(&session);
        let token = token.clone();
        thread::spawn(move || scheduler.run(&session, &token, SCHEDULER_FRAME))
    };

    let mut renderer = Renderer::new(settings.width, settings.height);
    let frame_time = Duration::from_micros(1_000_000 / settings.render_fps.max(1));
    let drawn = play(stdout, &session, &token, &mut renderer, frame_time);

    token.cancel();
    let stopped = worker
        .join()
        .map_err(|_| io::Error::other("scheduler thread panicked"))?;
    drawn?;
    stopped.map_err(io::Error::other)?;

    let session = session
        .lock()
        .map_err(|_| io::Error::other("game state poisoned"))?;
    if let Some(err) = session.failure() {
        return Err(io::Error::other(err.clone()));
    }
    if session.game.is_over() {
        renderer.game_over(stdout, &session)?;
        drop(session);
        wait_for_quit()?;
    }
    Ok(())
}

/// Input and drawing on the main thread until quit or the scheduler stops.
fn play(
    stdout: &mut Stdout,
    session: &Mutex<Session>,
    token: &CancelToken,
    renderer: &mut Renderer,
    frame_time: Duration,
) -> io::Result<()> {
    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            let mut state = session
                .lock()
                .map_err(|_| io::Error::other("game state poisoned"))?;
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('a') => {
                    state.manual_mode = !state.manual_mode;
                    state.manual = None;
                    tracing::info!(manual = state.manual_mode, "steering toggled");
                }
                KeyCode::Char(c) => {
                    if let Some(dir) = dir_for_key(c) {
                        state.manual_mode = true;
                        state.manual = Some(dir);
                    }
                }
                _ => {}
            }
        }

        {
            let state = session
                .lock()
                .map_err(|_| io::Error::other("game state poisoned"))?;
            renderer.draw(stdout, &state)?;
        }
        if token.is_cancelled() {
            return Ok(());
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for_key(c: char) -> Option<Dir> {
    match c {
        'k' => Some(Dir::North),
        'j' => Some(Dir::South),
        'h' => Some(Dir::West),
        'l' => Some(Dir::East),
        _ => None,
    }
}

fn wait_for_quit() -> io::Result<()> {
    loop {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(());
                }
            }
        }
    }
}
