use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::{QueueableCommand, cursor, style, terminal};

/// Raw-mode alternate screen for the dashboard.
///
/// The terminal is restored on drop, including when setup fails halfway or
/// `main` unwinds with an error.
pub struct Screen<W: Write = Stdout> {
    out: W,
    restored: bool,
}

impl Screen<Stdout> {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> Screen<W> {
    /// Switch `out` to the alternate screen with the cursor hidden.
    ///
    /// On error the half-built screen is dropped, which restores the terminal.
    pub fn with_writer(out: W) -> Result<Self> {
        let mut screen = Self {
            out,
            restored: false,
        };
        screen
            .out
            .queue(terminal::EnterAlternateScreen)?
            .queue(cursor::Hide)?;
        screen.out.flush().context("failed to set up terminal")?;
        Ok(screen)
    }

    /// Clear the screen and write `frame` as a single flush.
    pub fn draw(&mut self, frame: &str) -> Result<()> {
        self.out
            .queue(terminal::Clear(terminal::ClearType::All))?
            .queue(cursor::MoveTo(0, 0))?
            .queue(style::Print(frame))?;
        self.out.flush().context("failed to draw dashboard")?;
        Ok(())
    }

    /// Leave the alternate screen and turn raw mode off. Idempotent.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = self.out.queue(cursor::Show);
        let _ = self.out.queue(terminal::LeaveAlternateScreen);
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }

    #[cfg(test)]
    pub(crate) fn writer(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Drop for Screen<W> {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const LEAVE_ALT_SCREEN: &str = "\x1b[?1049l";
    const SHOW_CURSOR: &str = "\x1b[?25h";

    /// Writer that shares its bytes with the test and fails the first
    /// `failing_flushes` flushes.
    #[derive(Clone, Default)]
    struct Recorder {
        bytes: Arc<Mutex<Vec<u8>>>,
        failing_flushes: Arc<Mutex<usize>>,
    }

    impl Recorder {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.bytes.lock().unwrap()).into_owned()
        }
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            let mut failing = self.failing_flushes.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                return Err(io::Error::other("terminal gone"));
            }
            Ok(())
        }
    }

    #[test]
    fn failed_setup_restores_terminal() {
        let rec = Recorder::default();
        *rec.failing_flushes.lock().unwrap() = 1;

        assert!(Screen::with_writer(rec.clone()).is_err());
        let out = rec.text();
        assert!(out.contains(LEAVE_ALT_SCREEN));
        assert!(out.contains(SHOW_CURSOR));
    }

    #[test]
    fn restore_runs_once() {
        let rec = Recorder::default();
        let mut screen = Screen::with_writer(rec.clone()).expect("screen");
        screen.restore();
        drop(screen);
        assert_eq!(rec.text().matches(LEAVE_ALT_SCREEN).count(), 1);
    }

    #[test]
    fn draw_clears_then_prints() {
        let rec = Recorder::default();
        let mut screen = Screen::with_writer(rec.clone()).expect("screen");
        screen.draw("hello").expect("draw");
        let out = rec.text();
        let clear = out.find("\x1b[2J").expect("clear sequence");
        let body = out.find("hello").expect("frame body");
        assert!(clear < body);
    }
}
