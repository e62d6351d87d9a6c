use crate::celebration::Celebration;
use crate::entry::Entry;
use crate::phase::Phase;
use crate::renderer::{Renderer, RoundStatus};
use crate::timer::{Timer, earliest};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};

/// Shuffle cadence. Constant, the draw never speeds up or slows down.
pub const TICK_INTERVAL: Duration = Duration::from_millis(110);

#[derive(Debug)]
pub struct Lottery<R: Renderer, G: Rng = StdRng> {
    entries: Vec<Entry>,
    pool: Vec<Entry>,
    winners: Vec<Entry>,
    current_round: u32,
    max_rounds: u32,
    phase: Phase,
    // index into `pool` of the card on display
    current: usize,
    ticks: u64,
    tick_timer: Timer,
    celebration: Celebration,
    renderer: R,
    rng: G,
}

impl<R: Renderer, G: Rng> Lottery<R, G> {
    /// `max_rounds` is clamped to `1..=entries.len()` so every round has a card to draw.
    pub fn new(entries: Vec<Entry>, max_rounds: u32, renderer: R, rng: G) -> Self {
        let max_rounds = max_rounds.clamp(1, (entries.len() as u32).max(1));
        let mut lottery = Self {
            pool: entries.clone(),
            entries,
            winners: Vec::new(),
            current_round: 1,
            max_rounds,
            phase: Phase::default(),
            current: 0,
            ticks: 0,
            tick_timer: Timer::default(),
            celebration: Celebration::default(),
            renderer,
            rng,
        };
        lottery.show_initial();
        lottery
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn pool(&self) -> &[Entry] {
        &self.pool
    }

    pub fn winners(&self) -> &[Entry] {
        &self.winners
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input_enabled(&self) -> bool {
        self.phase != Phase::Complete
    }

    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            current: self.current_round,
            max: self.max_rounds,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Starts the shuffle when idle, stops it and commits the displayed card when running.
    /// Ignored once every round is drawn.
    pub fn toggle(&mut self, now: Instant) {
        match self.phase {
            Phase::Complete => log::debug!("toggle ignored, all rounds complete"),
            Phase::Running => self.stop(now),
            Phase::Idle => self.start(now),
        }
    }

    /// Fires every timer that is due at `now`.
    pub fn advance(&mut self, now: Instant) {
        if self.tick_timer.fire(now) {
            self.tick(now);
        }

        let update = self.celebration.advance(now, &mut self.rng);
        if update.confetti_changed {
            self.renderer.show_confetti(self.celebration.particles());
        }
        if update.finished {
            self.renderer.finish_celebration();
        }
    }

    /// When the host loop next has to call [`Lottery::advance`].
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.tick_timer.deadline(), self.celebration.next_deadline())
    }

    /// Uniform index into the pool, `None` when the pool is empty.
    pub fn pick_random_index(&mut self) -> Option<usize> {
        if self.pool.is_empty() {
            None
        } else {
            Some(self.rng.random_range(0..self.pool.len()))
        }
    }

    pub fn restart(&mut self) {
        self.tick_timer.cancel();
        self.cancel_celebration();

        self.pool = self.entries.clone();
        self.winners.clear();
        self.current_round = 1;
        self.phase = Phase::default();
        self.current = 0;
        self.ticks = 0;

        self.show_initial();
        log::info!("Restarted, ready for round 1");
    }

    fn cancel_celebration(&mut self) {
        if self.celebration.cancel() {
            log::debug!("celebration cut short");
        }
        self.renderer.cancel_celebration();
    }

    fn show_initial(&mut self) {
        self.renderer.reset();
        if let Some(entry) = self.pool.get(self.current) {
            self.renderer.show_entry(entry);
        }
        self.renderer.show_round_status(self.status());
    }

    fn start(&mut self, now: Instant) {
        if self.pool.is_empty() {
            log::warn!("no cards left to shuffle");
            return;
        }
        log::info!(
            "Starting shuffle for round {}, {}ms per card",
            self.current_round,
            TICK_INTERVAL.as_millis()
        );

        self.cancel_celebration();

        self.phase = Phase::Running;
        self.ticks = 0;
        self.tick(now);
    }

    fn tick(&mut self, now: Instant) {
        if self.phase != Phase::Running {
            return;
        }
        // hold the current card
        let Some(index) = self.pick_random_index() else {
            return;
        };
        self.current = index;
        self.renderer.show_entry(&self.pool[index]);
        self.ticks += 1;
        log::debug!("shuffle #{} shows {}", self.ticks, self.pool[index].name());
        self.tick_timer.schedule_after(now, TICK_INTERVAL);
    }

    fn stop(&mut self, now: Instant) {
        // no tick may fire once the winner is committed
        self.tick_timer.cancel();
        self.phase = Phase::Idle;
        log::info!("Stopped after {} cards", self.ticks);
        self.commit_winner(now);
    }

    fn commit_winner(&mut self, now: Instant) {
        if self.pool.is_empty() {
            return;
        }
        let index = self.current.min(self.pool.len() - 1);
        let winner = self.pool.remove(index);
        self.current = 0;

        self.renderer.show_winner(&winner);
        log::info!("Round {} winner: {}", self.current_round, winner.name());
        log::info!("Cards remaining: {}", self.pool.len());
        self.winners.push(winner);

        self.celebration.start(now);
        self.renderer.play_celebration();

        self.current_round += 1;
        self.renderer.show_round_status(self.status());

        if self.current_round > self.max_rounds {
            self.on_all_rounds_complete();
        }
    }

    fn on_all_rounds_complete(&mut self) {
        if self.phase == Phase::Complete {
            return;
        }
        self.phase = Phase::Complete;
        self.tick_timer.cancel();

        let names: Vec<&str> = self.winners.iter().map(Entry::name).collect();
        log::info!("All rounds complete, winners: {names:?}");
        self.renderer.show_final_results(&self.winners);
    }
}
