use std::io::Write;
use std::ops::Range;
use std::time::Duration;

use anyhow::Result;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Stylize};
use tokio::time::Instant;

use crate::config::SettingsConfig;
use crate::state::StatusTable;
use crate::terminal::Screen;
use crate::types::WalletState;

/// Default number of wallets per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Default minimum gap between two draws.
pub const DEFAULT_MIN_RENDER_INTERVAL: Duration = Duration::from_millis(100);

const BANNER: &str = r"
 _                           _ _____    _
| |    __ _ _   _  ___ _ __ | | ____|__| | __ _  ___
| |   / _` | | | |/ _ \ '__|| |  _| / _` |/ _` |/ _ \
| |__| (_| | |_| |  __/ |   | | |__| (_| | (_| |  __/
|_____\__,_|\__, |\___|_|   |_|_____\__,_|\__, |\___|
            |___/                         |___/";

const RULE: &str = "===============================================";

/// Page and selection over a fixed-size list of rows.
///
/// `selected` is an absolute row index and always falls inside the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    total: usize,
    page_size: usize,
    page: usize,
    selected: usize,
}

impl Pager {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
            page: 0,
            selected: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// `ceil(total / page_size)`; zero when there are no rows.
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Absolute row indices visible on the current page.
    pub fn visible(&self) -> Range<usize> {
        let start = (self.page * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn up(&mut self) -> bool {
        if self.selected > self.visible().start {
            self.selected -= 1;
            true
        } else {
            false
        }
    }

    pub fn down(&mut self) -> bool {
        if self.selected + 1 < self.visible().end {
            self.selected += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        self.selected = self.visible().start;
        true
    }

    pub fn next_page(&mut self) -> bool {
        if self.page + 1 >= self.page_count() {
            return false;
        }
        self.page += 1;
        self.selected = self.visible().start;
        true
    }
}

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Redraw,
    Ignore,
}

/// Apply a key press to the pager.
///
/// Arrow keys always request a redraw, even at a boundary where they move nothing.
pub fn handle_key(pager: &mut Pager, key: KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Up => {
            pager.up();
            KeyAction::Redraw
        }
        KeyCode::Down => {
            pager.down();
            KeyAction::Redraw
        }
        KeyCode::Left => {
            pager.prev_page();
            KeyAction::Redraw
        }
        KeyCode::Right => {
            pager.next_page();
            KeyAction::Redraw
        }
        _ => KeyAction::Ignore,
    }
}

/// `0x1234...abcd` form of an address. Short inputs are returned whole.
pub fn short_address(wallet: &str) -> String {
    let chars: Vec<char> = wallet.chars().collect();
    if chars.len() <= 10 {
        return wallet.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn state_color(state: WalletState) -> Color {
    match state {
        WalletState::Running => Color::Green,
        WalletState::Error => Color::Red,
        WalletState::Claimed => Color::Magenta,
        WalletState::ClaimFailed => Color::DarkYellow,
        WalletState::Starting => Color::Blue,
    }
}

/// Build one dashboard frame as `\r\n`-separated lines.
pub fn render_frame(table: &StatusTable, pager: &Pager, heartbeat_interval: Duration) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in BANNER.lines().skip(1) {
        out.push(line.cyan().bold().to_string());
    }
    out.push(RULE.dark_grey().to_string());
    out.push(format!("{}", "Wallet heartbeat dashboard".white()));
    out.push(RULE.dark_grey().to_string());
    out.push(String::new());

    let wallets = table.wallets();
    for i in pager.visible() {
        let wallet = &wallets[i];
        let prefix = if i == pager.selected() {
            format!("{} ", "→".cyan())
        } else {
            "  ".to_string()
        };
        out.push(format!("{prefix}Wallet: {}", short_address(wallet).yellow()));

        let Some(status) = table.status(wallet) else {
            continue;
        };
        out.push(format!(
            "   Status: {}",
            status.state.label().with(state_color(status.state))
        ));
        out.push(format!("   Points: {}", status.points.to_string().blue()));
        let last = status
            .last_heartbeat
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push(format!("   Last heartbeat: {}", last.blue()));
        if let Some(err) = &status.error {
            out.push(format!("   Error: {}", err.as_str().red()));
        }
        out.push(String::new());
    }

    out.push(String::new());
    out.push(format!(
        "{}",
        format!("Page {}/{}", pager.page() + 1, pager.page_count().max(1)).dark_grey()
    ));
    out.push(String::new());
    out.push(format!("{}", "Config:".magenta().bold()));
    out.push(format!(
        "{}",
        format!("Heartbeat interval: {}s", heartbeat_interval.as_secs()).white()
    ));
    out.push(String::new());
    out.push(format!("{}", "Controls:".magenta().bold()));
    out.push(format!(
        "{}",
        "↑/↓: select | ←/→: page | q/Ctrl+C: quit".white()
    ));
    out.push(String::new());

    out.join("\r\n")
}

/// Single-slot redraw debounce.
///
/// A request within `min_interval` of the last draw arms (or re-arms) one
/// pending deadline instead of drawing; there is never more than one pending.
#[derive(Debug)]
pub struct RenderThrottle {
    min_interval: Duration,
    last_draw: Option<Instant>,
    pending: Option<Instant>,
}

impl RenderThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_draw: None,
            pending: None,
        }
    }

    /// Returns `true` if the caller should draw right away.
    pub fn request(&mut self, now: Instant) -> bool {
        match self.last_draw {
            Some(last) if now.saturating_duration_since(last) < self.min_interval => {
                self.pending = Some(now + self.min_interval);
                false
            }
            _ => true,
        }
    }

    /// Deadline of the deferred draw, if one is armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Record a draw; clears any pending deadline.
    pub fn drawn(&mut self, now: Instant) {
        self.last_draw = Some(now);
        self.pending = None;
    }
}

/// Everything the event loop draws from, owned in one place.
pub struct View<W: Write> {
    pub table: StatusTable,
    pub pager: Pager,
    pub screen: Screen<W>,
    throttle: RenderThrottle,
    heartbeat_interval: Duration,
}

impl<W: Write> View<W> {
    pub fn new(table: StatusTable, screen: Screen<W>, settings: &SettingsConfig) -> Self {
        Self {
            pager: Pager::new(table.len(), settings.page_size),
            table,
            screen,
            throttle: RenderThrottle::new(settings.min_render_interval()),
            heartbeat_interval: settings.heartbeat_interval(),
        }
    }

    /// When the deferred draw is due, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.throttle.deadline()
    }

    /// Draw now, or defer to the throttle's deadline if the last draw was too recent.
    pub fn request_draw(&mut self) -> Result<()> {
        if self.throttle.request(Instant::now()) {
            self.draw()?;
        }
        Ok(())
    }

    /// Draw the current state unconditionally.
    pub fn draw(&mut self) -> Result<()> {
        let frame = render_frame(&self.table, &self.pager, self.heartbeat_interval);
        self.screen.draw(&frame)?;
        self.throttle.drawn(Instant::now());
        Ok(())
    }
}
