use crate::action::{Action, InputSource};
use crate::args::LotteryArgs;
use crate::celebration::Confetti;
use crate::entry::{Entry, EntryKind, PLACEHOLDER_PALETTE};
use crate::lottery::Lottery;
use crate::renderer::{Renderer, RoundStatus, results_lines};
use crate::source::{load_entries, scan_image_dir};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::{DefaultTerminal, Frame};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 12;
/// Redraw rate while confetti is falling.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const IDLE_POLL: Duration = Duration::from_millis(500);
/// Time a particle takes to cross the screen once its delay has passed.
const CONFETTI_FALL: Duration = Duration::from_millis(3000);
const CELEBRATION_BG: Color = Color::Rgb(48, 36, 8);

struct MouseCapture;

impl MouseCapture {
    fn enable() -> Result<Self> {
        std::io::stdout().execute(event::EnableMouseCapture)?;
        Ok(Self)
    }
}

impl Drop for MouseCapture {
    fn drop(&mut self) {
        let _ = std::io::stdout().execute(event::DisableMouseCapture);
    }
}

// stdout belongs to the terminal ui, so logs go to a file
fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path).wrap_err_with(|| format!("creating {}", path.display()))?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), file)?;
    Ok(())
}

pub fn main(args: LotteryArgs) -> Result<()> {
    color_eyre::install()?;
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let names = if args.images.is_empty() && args.scan {
        scan_image_dir(&args.image_dir).unwrap_or_else(|e| {
            log::warn!("{e:#}, using placeholder cards");
            Vec::new()
        })
    } else {
        args.images.clone()
    };
    let entries = load_entries(&args.image_dir, &names);
    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let lottery = Lottery::new(entries, args.rounds, TerminalRenderer::default(), rng);
    log::info!(
        "{} cards, {} rounds",
        lottery.entries().len(),
        lottery.max_rounds()
    );

    let terminal = ratatui::init();
    let result = App::new(lottery, CrosstermInput).run(terminal);
    ratatui::restore();
    result
}

#[derive(Debug)]
struct Card {
    entry: Entry,
    winner: bool,
    missing: bool,
}

/// Keeps what the lottery asked to show until the next frame is drawn.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    card: Option<Card>,
    status: Option<RoundStatus>,
    celebrating: bool,
    confetti: Vec<Confetti>,
    results: Option<Vec<String>>,
    // per-shuffle wobble of the card, in cells
    jitter: (i16, i16),
}

impl TerminalRenderer {
    pub fn is_animating(&self) -> bool {
        !self.confetti.is_empty()
    }

    pub fn draw(&self, frame: &mut Frame, now: Instant) {
        let [title, main, status, keys] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(
            Line::from("Lottery!").bold().light_blue().centered(),
            title,
        );

        if self.celebrating {
            frame.render_widget(Block::new().style(Style::new().bg(CELEBRATION_BG)), main);
        }
        if let Some(card) = &self.card {
            self.draw_card(frame, main, card);
        }
        self.draw_confetti(frame, main, now);

        if let Some(round) = self.status {
            let line = Line::from(round.to_string()).bold().centered();
            let line = if round.is_complete() {
                line.light_green()
            } else {
                line
            };
            frame.render_widget(line, status);
        }
        frame.render_widget(
            Line::from("(Space) draw/stop  (R)estart  (Q)uit")
                .dark_gray()
                .centered(),
            keys,
        );

        if let Some(lines) = &self.results {
            draw_results(frame, main, lines);
        }
    }

    fn draw_card(&self, frame: &mut Frame, area: Rect, card: &Card) {
        let (dx, dy) = self.jitter;
        let x = (area.x + area.width.saturating_sub(CARD_WIDTH) / 2).saturating_add_signed(dx);
        let y = (area.y + area.height.saturating_sub(CARD_HEIGHT) / 2).saturating_add_signed(dy);
        let rect = Rect::new(x, y, CARD_WIDTH, CARD_HEIGHT).clamp(area);

        let mut block = Block::bordered().title(Line::from(card.entry.name()).centered());
        if card.winner {
            block = block
                .border_style(Style::new().light_green().bold())
                .title_bottom(Line::from("* Winner! *").bold().light_green().centered());
        }

        let spacer = Line::from("");
        let paragraph = match &card.entry.kind {
            EntryKind::Placeholder { color, label } => Paragraph::new(vec![
                spacer.clone(),
                spacer,
                Line::from(label.as_str()).bold().white(),
                Line::from("The New Yorker").italic().white(),
            ])
            .style(Style::new().bg(Color::from_u32(*color))),
            EntryKind::Image { .. } if card.missing => Paragraph::new(vec![
                spacer.clone(),
                spacer,
                Line::from("[ photo ]").gray(),
                Line::from("Image not found").gray(),
            ]),
            EntryKind::Image { path, name } => Paragraph::new(vec![
                spacer.clone(),
                spacer,
                Line::from(name.as_str()).bold(),
                Line::from(path.display().to_string()).dark_gray(),
            ]),
        };

        frame.render_widget(Clear, rect);
        frame.render_widget(paragraph.centered().block(block), rect);
    }

    fn draw_confetti(&self, frame: &mut Frame, area: Rect, now: Instant) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for c in &self.confetti {
            let Some(falling) = now
                .saturating_duration_since(c.born)
                .checked_sub(c.delay)
            else {
                continue;
            };
            let progress = falling.as_secs_f32() / CONFETTI_FALL.as_secs_f32();
            if progress >= 1.0 {
                continue;
            }
            let x = area.x + (c.left * area.width as f32) as u16;
            let y = area.y + (progress * area.height as f32) as u16;
            let color = Color::from_u32(PLACEHOLDER_PALETTE[c.id % PLACEHOLDER_PALETTE.len()]);
            let symbol = if c.size >= 12 { '■' } else { '▪' };
            if let Some(cell) = frame.buffer_mut().cell_mut((x, y)) {
                cell.set_char(symbol).set_fg(color);
            }
        }
    }
}

fn draw_results(frame: &mut Frame, area: Rect, lines: &[String]) {
    let width = lines
        .iter()
        .map(|l| l.chars().count() as u16)
        .max()
        .unwrap_or(0)
        .max(20)
        + 4;
    let height = lines.len() as u16 + 2;
    let rect = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
    .clamp(area);

    let text: Vec<Line> = lines.iter().map(|l| Line::from(l.as_str())).collect();
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(text).centered().block(
            Block::bordered()
                .title(Line::from("Winners").bold().light_green().centered())
                .title_bottom(Line::from("(R)estart").centered()),
        ),
        rect,
    );
}

impl Renderer for TerminalRenderer {
    fn show_entry(&mut self, entry: &Entry) {
        let missing = match &entry.kind {
            EntryKind::Image { path, .. } => !path.is_file(),
            EntryKind::Placeholder { .. } => false,
        };
        if missing {
            log::debug!("image not found for {}", entry.name());
        }
        self.card = Some(Card {
            entry: entry.clone(),
            winner: false,
            missing,
        });
        let mut rng = rand::rng();
        self.jitter = (rng.random_range(-2..=2), rng.random_range(-1..=1));
    }

    fn show_winner(&mut self, entry: &Entry) {
        let missing = self.card.as_ref().is_some_and(|c| c.missing);
        self.card = Some(Card {
            entry: entry.clone(),
            winner: true,
            missing,
        });
        self.jitter = (0, 0);
    }

    fn show_round_status(&mut self, status: RoundStatus) {
        self.status = Some(status);
    }

    fn play_celebration(&mut self) {
        self.celebrating = true;
    }

    fn show_confetti(&mut self, confetti: &[Confetti]) {
        self.confetti = confetti.to_vec();
    }

    fn finish_celebration(&mut self) {
        self.celebrating = false;
    }

    fn cancel_celebration(&mut self) {
        self.celebrating = false;
        self.confetti.clear();
    }

    fn show_final_results(&mut self, winners: &[Entry]) {
        self.results = Some(results_lines(winners));
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Keyboard and mouse through crossterm. Any click toggles the draw.
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn next_action(&mut self, timeout: Duration) -> Result<Option<Action>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let action = match event::read()? {
            // it's important to check KeyEventKind::Press to avoid handling key release events
            Event::Key(key) if key.kind == KeyEventKind::Press => key_action(key),
            Event::Mouse(m) => match m.kind {
                MouseEventKind::Down(_) => Some(Action::Toggle),
                _ => None,
            },
            _ => None,
        };
        Ok(action)
    }
}

fn key_action(key: KeyEvent) -> Option<Action> {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc | KeyCode::Char('q' | 'Q'))
        | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => Some(Action::Quit),
        (_, KeyCode::Char(' ') | KeyCode::Enter) => Some(Action::Toggle),
        (_, KeyCode::Char('r' | 'R')) => Some(Action::Restart),
        _ => None,
    }
}

/// The main application which holds the lottery and drives its timers.
pub struct App<I: InputSource> {
    /// Is the application running?
    running: bool,
    lottery: Lottery<TerminalRenderer>,
    input: I,
}

impl<I: InputSource> App<I> {
    pub fn new(lottery: Lottery<TerminalRenderer>, input: I) -> Self {
        Self {
            running: false,
            lottery,
            input,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        let _mouse = MouseCapture::enable()?;

        self.running = true;
        while self.running {
            terminal.draw(|frame| self.lottery.renderer().draw(frame, Instant::now()))?;
            if let Some(action) = self.input.next_action(self.poll_timeout(Instant::now()))? {
                self.handle(action, Instant::now());
            }
            self.lottery.advance(Instant::now());
        }

        log::info!(
            "Quit in {:?} at round {}, {} winners, {} cards left",
            self.lottery.phase(),
            self.lottery.current_round(),
            self.lottery.winners().len(),
            self.lottery.pool().len()
        );
        Ok(())
    }

    /// Sleep until the next lottery timer, or the next frame while confetti falls.
    fn poll_timeout(&self, now: Instant) -> Duration {
        let timeout = self
            .lottery
            .next_deadline()
            .map_or(IDLE_POLL, |at| at.saturating_duration_since(now));
        if self.lottery.renderer().is_animating() {
            timeout.min(FRAME_INTERVAL)
        } else {
            timeout.min(IDLE_POLL)
        }
    }

    fn handle(&mut self, action: Action, now: Instant) {
        match action {
            Action::Toggle if self.lottery.input_enabled() => self.lottery.toggle(now),
            Action::Toggle => log::debug!("input disabled until restart"),
            Action::Restart => self.lottery.restart(),
            Action::Quit => self.running = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;
    use crate::source::load_entries;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use std::path::Path;

    struct Scripted(VecDeque<Action>);

    impl InputSource for Scripted {
        fn next_action(&mut self, _timeout: Duration) -> Result<Option<Action>> {
            Ok(self.0.pop_front())
        }
    }

    fn lottery(rounds: u32) -> Lottery<TerminalRenderer> {
        Lottery::new(
            load_entries(Path::new("images"), &[]),
            rounds,
            TerminalRenderer::default(),
            StdRng::seed_from_u64(1),
        )
    }

    fn screen(renderer: &TerminalRenderer) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        terminal
            .draw(|frame| renderer.draw(frame, Instant::now()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn keys_map_to_actions() {
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key_action(key(KeyCode::Char(' '))), Some(Action::Toggle));
        assert_eq!(key_action(key(KeyCode::Enter)), Some(Action::Toggle));
        assert_eq!(key_action(key(KeyCode::Char('r'))), Some(Action::Restart));
        assert_eq!(key_action(key(KeyCode::Char('q'))), Some(Action::Quit));
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        assert_eq!(key_action(shifted('R')), Some(Action::Restart));
        assert_eq!(key_action(shifted('Q')), Some(Action::Quit));
        assert_eq!(key_action(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            key_action(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(key_action(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn draws_first_guest_and_round() {
        let lottery = lottery(4);
        let screen = screen(lottery.renderer());
        assert!(screen.contains("Guest 1"));
        assert!(screen.contains("The New Yorker"));
        assert!(screen.contains("Round 1 of 4"));
    }

    #[test]
    fn completion_shows_winners() {
        let mut lottery = lottery(1);
        let now = Instant::now();
        lottery.toggle(now);
        lottery.toggle(now);
        let winner = lottery.winners()[0].name().to_string();

        let screen = screen(lottery.renderer());
        assert!(screen.contains("All Rounds Complete!"));
        assert!(screen.contains("Winners"));
        assert!(screen.contains(&format!("Round 1: {winner}")));
    }

    #[test]
    fn missing_image_falls_back() {
        let entries = load_entries(
            Path::new("/definitely/not/here"),
            &["ghost.jpg".to_string()],
        );
        let lottery = Lottery::new(
            entries,
            1,
            TerminalRenderer::default(),
            StdRng::seed_from_u64(0),
        );
        assert!(screen(lottery.renderer()).contains("Image not found"));
    }

    #[test]
    fn cancel_clears_celebration() {
        let mut renderer = TerminalRenderer::default();
        renderer.play_celebration();
        renderer.show_confetti(&[Confetti {
            id: 0,
            left: 0.5,
            delay: Duration::ZERO,
            size: 10,
            born: Instant::now(),
        }]);
        assert!(renderer.is_animating());
        renderer.cancel_celebration();
        assert!(!renderer.celebrating);
        assert!(!renderer.is_animating());
    }

    #[test]
    fn app_handles_scripted_actions() {
        let mut app = App::new(lottery(4), Scripted(VecDeque::new()));
        let now = Instant::now();
        app.handle(Action::Toggle, now);
        assert_eq!(app.lottery.phase(), Phase::Running);
        assert!(app.poll_timeout(now) <= crate::lottery::TICK_INTERVAL);
        app.handle(Action::Toggle, now);
        assert_eq!(app.lottery.winners().len(), 1);
        app.handle(Action::Restart, now);
        assert!(app.lottery.winners().is_empty());
        app.running = true;
        app.handle(Action::Quit, now);
        assert!(!app.running);
    }

    #[test]
    fn toggle_after_completion_changes_nothing() {
        let mut app = App::new(lottery(1), Scripted(VecDeque::new()));
        let now = Instant::now();
        app.handle(Action::Toggle, now);
        app.handle(Action::Toggle, now);
        assert_eq!(app.lottery.phase(), Phase::Complete);
        assert!(!app.lottery.input_enabled());
        let winners: Vec<usize> = app.lottery.winners().iter().map(|e| e.id).collect();
        let deadline = app.lottery.next_deadline();

        app.handle(Action::Toggle, now);
        assert_eq!(app.lottery.phase(), Phase::Complete);
        assert_eq!(app.lottery.pool().len(), 9);
        assert_eq!(app.lottery.current_round(), 2);
        assert_eq!(
            app.lottery.winners().iter().map(|e| e.id).collect::<Vec<_>>(),
            winners
        );
        assert_eq!(app.lottery.next_deadline(), deadline);
    }
}
