use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute, terminal,
};
use std::fs::{self, File};
use std::io::{self, Stdout, Write, stdout};
use std::time::{Duration, Instant};

use flappy_arcade::audio::Audio;
use flappy_arcade::input::InputMap;
use flappy_arcade::render::{TerminalCanvas, draw_scene};
use flappy_arcade::{Config, Error, Game, Result};

/// Longest we block on input when nothing is scheduled sooner.
const IDLE_POLL: Duration = Duration::from_millis(50);

fn init_logging(config: &Config) -> Result<()> {
    let path = config.log_path();
    let open = || -> std::io::Result<File> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        File::options().create(true).append(true).open(&path)
    };
    let file = open().map_err(|source| Error::LogFile {
        path: path.clone(),
        source,
    })?;

    // stderr belongs to the alternate screen while the game runs.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        EnableMouseCapture,
    )
}

/// Undo [`enter_screen`] and leave raw mode. Raw mode is always left, even
/// when writing the escape sequences fails.
fn restore_terminal(
    out: &mut impl Write,
    disable_raw: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let screen = execute!(
        out,
        DisableMouseCapture,
        terminal::LeaveAlternateScreen,
        cursor::Show,
        terminal::EnableLineWrap,
    );
    let raw = disable_raw();
    screen.and(raw)
}

fn run(game: &mut Game, inputs: &InputMap, out: &mut Stdout) -> Result<()> {
    let (cols, rows) = terminal::size()?;
    let field = &game.config().playfield;
    let mut canvas = TerminalCanvas::new(cols, rows, field.width, field.height);

    let clock = Instant::now();
    let mut dirty = true;

    loop {
        if dirty {
            draw_scene(game, &mut canvas);
            canvas.present(out)?;
            dirty = false;
        }

        // Sleep until input arrives or the next frame/spawn is due.
        let wait = game
            .time_until_next(clock.elapsed())
            .map_or(IDLE_POLL, |due| due.min(IDLE_POLL));
        while event::poll(wait)? {
            match event::read()? {
                Event::Resize(c, r) => canvas.resize(c, r),
                event => {
                    if let Some(command) = inputs.command_for(&event) {
                        if !game.handle(command, clock.elapsed()) {
                            return Ok(());
                        }
                    }
                }
            }
            dirty = true;
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }

        if game.advance(clock.elapsed()) > 0 {
            dirty = true;
        }
    }
}

fn main() -> Result<()> {
    // Config problems are reported before the terminal is taken over.
    let config = Config::load()?;
    init_logging(&config)?;
    match Config::source_path() {
        Some(path) if path.exists() => log::info!("Loaded config from {}", path.display()),
        _ => log::info!("Using default config"),
    }

    let soundtrack = Audio::open_or_silent(&config.audio);
    let mut game = Game::new(config, soundtrack);
    let inputs = InputMap::default();

    terminal::enable_raw_mode()?;
    let mut out = stdout();
    let result = enter_screen(&mut out)
        .map_err(Error::from)
        .and_then(|()| run(&mut game, &inputs, &mut out));
    if let Err(err) = &result {
        log::error!("Game loop failed: {err}");
    }

    let restored = restore_terminal(&mut out, terminal::disable_raw_mode);
    log::info!("Exiting");
    result?;
    Ok(restored?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn raw_mode_is_left_even_if_the_screen_cannot_be_restored() {
        let left_raw = Cell::new(false);
        let result = restore_terminal(&mut BrokenPipe, || {
            left_raw.set(true);
            Ok(())
        });
        assert!(result.is_err());
        assert!(left_raw.get());
    }

    #[test]
    fn restore_writes_the_teardown_sequence() {
        let mut out = Vec::new();
        restore_terminal(&mut out, || Ok(())).unwrap();
        // Show cursor.
        assert!(String::from_utf8(out).unwrap().contains("\x1b[?25h"));
    }
}
