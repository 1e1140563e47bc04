//! Crossterm terminal host for blockview.
//!
//! Provides a [`CrosstermDriver`] that implements
//! [`blockview_core::EventLoopDriver`]. The scene is drawn as a flat
//! top-down view through the [`TerminalPresenter`]; only texels that
//! changed since the previous frame are written.

mod canvas;
mod input;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyboardEnhancementFlags},
    queue,
    style::{self, Color as CtColor, SetBackgroundColor},
    terminal::{self, ClearType},
};

use blockview_core::{
    Camera, Color, Engine, EventLoopDriver, FrameLoop, Point, Presenter, SceneGraph, Scheduler,
};

use canvas::{Canvas, Texel};

/// Maps a [`blockview_core::Color`] to a [`crossterm::style::Color`].
fn to_ct_color(c: Color) -> CtColor {
    CtColor::Rgb {
        r: c.r(),
        g: c.g(),
        b: c.b(),
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Terminal host settings.
#[derive(Clone, Debug, PartialEq)]
pub struct CrosstermConfig {
    /// Target time between frames.
    pub frame_interval: Duration,
    /// Top-left corner of the board border, in terminal cells.
    pub origin: (u16, u16),
    /// Ask the terminal for bare modifier presses when it supports it.
    pub keyboard_enhancement: bool,
    /// Print the key legend under the board.
    pub legend: bool,
}

impl Default for CrosstermConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            origin: (2, 1),
            keyboard_enhancement: true,
            legend: true,
        }
    }
}

// ---------------------------------------------------------------------------
// FrameClock
// ---------------------------------------------------------------------------

/// Deadline-based [`Scheduler`]. Late frames run immediately but are not
/// doubled up.
#[derive(Debug)]
pub struct FrameClock {
    interval: Duration,
    last: Instant,
    next: Option<Instant>,
}

impl FrameClock {
    /// A clock whose first frame is due now.
    pub fn new(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            interval,
            last: now,
            next: Some(now),
        }
    }

    /// How long the host may block waiting for input.
    pub fn timeout(&self, now: Instant) -> Duration {
        match self.next {
            Some(t) => t.saturating_duration_since(now),
            None => self.interval,
        }
    }

    /// Consume the pending frame if it is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(t) if t <= now => {
                self.next = None;
                self.last = t;
                true
            }
            _ => false,
        }
    }

    fn schedule(&mut self, now: Instant) {
        let next = self.last + self.interval;
        self.next = Some(next.max(now));
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }
}

impl Scheduler for FrameClock {
    fn request_frame(&mut self) {
        self.schedule(Instant::now());
    }
}

// ---------------------------------------------------------------------------
// TerminalPresenter
// ---------------------------------------------------------------------------

const LEGEND: &str = "a/d move  q/e rotate  w drop  space down  esc quit";

/// Draws the scene into a bordered box on any [`Write`] sink.
pub struct TerminalPresenter<W: Write> {
    out: W,
    origin: (u16, u16),
    legend: bool,
    canvas: Canvas,
    prev: Option<Canvas>,
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W, size: Point, config: &CrosstermConfig) -> Self {
        Self {
            out,
            origin: config.origin,
            legend: config.legend,
            canvas: Canvas::new(size.x, size.y),
            prev: None,
        }
    }

    /// Force a full redraw, border included, on the next frame.
    pub fn invalidate(&mut self) {
        self.prev = None;
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Terminal position of a texel.
    fn screen_pos(&self, p: Point) -> (u16, u16) {
        let (ox, oy) = self.origin;
        (ox + 1 + 2 * p.x as u16, oy + 1 + p.y as u16)
    }

    fn draw_border(&mut self) -> io::Result<()> {
        let (ox, oy) = self.origin;
        let w = self.canvas.bounds().width() as usize * 2;
        let h = self.canvas.bounds().height() as u16;
        let bar = "─".repeat(w);

        queue!(
            self.out,
            style::ResetColor,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(ox, oy),
            style::Print(format!("┌{bar}┐")),
        )?;
        for row in 1..=h {
            queue!(
                self.out,
                cursor::MoveTo(ox, oy + row),
                style::Print("│"),
                cursor::MoveTo(ox + 1 + w as u16, oy + row),
                style::Print("│"),
            )?;
        }
        queue!(
            self.out,
            cursor::MoveTo(ox, oy + h + 1),
            style::Print(format!("└{bar}┘")),
        )?;
        if self.legend {
            queue!(self.out, cursor::MoveTo(ox, oy + h + 2), style::Print(LEGEND))?;
        }
        Ok(())
    }

    fn draw_texel(&mut self, p: Point, texel: Texel) -> io::Result<()> {
        let (x, y) = self.screen_pos(p);
        queue!(self.out, cursor::MoveTo(x, y))?;
        match texel {
            Texel::Blank => queue!(self.out, style::ResetColor, style::Print("  ")),
            Texel::Block(c) => queue!(
                self.out,
                SetBackgroundColor(to_ct_color(c)),
                style::Print("  ")
            ),
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.canvas.render(scene, camera);

        if self.prev.is_none() {
            self.draw_border()?;
        }
        let changes = match &self.prev {
            Some(prev) => self.canvas.diff(prev),
            None => self.canvas.diff(&Canvas::new(0, 0)),
        };
        for change in &changes {
            self.draw_texel(change.pos, change.texel)?;
        }
        queue!(self.out, style::ResetColor)?;
        self.out.flush()?;

        self.prev = Some(self.canvas.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CrosstermDriver
// ---------------------------------------------------------------------------

/// Puts the terminal in raw alternate-screen mode and restores it on drop.
struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    fn enter(want_enhancement: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        )?;
        let enhanced = want_enhancement && terminal::supports_keyboard_enhancement()?;
        if enhanced {
            queue!(
                stdout,
                event::PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        stdout.flush()?;
        log::debug!("terminal ready (keyboard enhancement: {enhanced})");
        Ok(Self { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.enhanced {
            let _ = queue!(stdout, event::PopKeyboardEnhancementFlags);
        }
        let _ = queue!(
            stdout,
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

/// A terminal back-end for blockview using crossterm.
#[derive(Debug, Default)]
pub struct CrosstermDriver {
    config: CrosstermConfig,
}

impl CrosstermDriver {
    /// Create a new driver.
    pub fn new(config: CrosstermConfig) -> Self {
        Self { config }
    }
}

impl EventLoopDriver for CrosstermDriver {
    fn run<E: Engine>(self, mut frames: FrameLoop<E>) -> Result<(), Box<dyn std::error::Error>> {
        let _guard = TerminalGuard::enter(self.config.keyboard_enhancement)?;
        let mut presenter = TerminalPresenter::new(io::stdout(), frames.board_size(), &self.config);
        let mut clock = FrameClock::new(self.config.frame_interval);

        while !frames.should_quit() {
            if event::poll(clock.timeout(Instant::now()))? {
                match event::read()? {
                    Event::Key(ev) => {
                        if let Some(msg) = input::to_msg(ev) {
                            frames.handle_msg(msg);
                        }
                    }
                    Event::Resize(w, h) => {
                        log::debug!("terminal resized to {w}x{h}");
                        presenter.invalidate();
                    }
                    _ => {}
                }
            }
            if clock.take_due(Instant::now()) {
                frames.tick(&mut presenter, &mut clock);
            }
        }

        log::info!("quit after {} frames", frames.frames());
        Ok(())
    }
}
