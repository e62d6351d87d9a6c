use crate::timer::{Timer, earliest};
use rand::Rng;
use std::time::{Duration, Instant};

pub const CELEBRATION_DURATION: Duration = Duration::from_millis(4000);
pub const CONFETTI_COUNT: usize = 50;
pub const CONFETTI_STAGGER: Duration = Duration::from_millis(100);
pub const CONFETTI_LIFETIME: Duration = Duration::from_millis(5000);
pub const CONFETTI_MAX_DELAY: Duration = Duration::from_secs(2);

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Confetti {
    pub id: usize,
    /// Horizontal position as a fraction of the screen width, `0.0..1.0`.
    pub left: f32,
    /// Time the particle waits before it starts falling.
    pub delay: Duration,
    pub size: u8,
    pub born: Instant,
}

impl Confetti {
    fn random<G: Rng>(id: usize, born: Instant, rng: &mut G) -> Self {
        Self {
            id,
            left: rng.random_range(0.0..1.0),
            delay: CONFETTI_MAX_DELAY.mul_f32(rng.random_range(0.0..1.0)),
            size: rng.random_range(8..=14),
            born,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.born + CONFETTI_LIFETIME
    }
}

/// What changed during one [`Celebration::advance`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CelebrationUpdate {
    pub confetti_changed: bool,
    pub finished: bool,
}

/// Background highlight plus a staggered burst of confetti.
#[derive(Debug, Default)]
pub struct Celebration {
    background: Timer,
    spawn: Timer,
    spawned: usize,
    next_id: usize,
    particles: Vec<Confetti>,
}

impl Celebration {
    /// Restarts the background timer and the spawn schedule. Particles already falling
    /// are left to expire on their own.
    pub fn start(&mut self, now: Instant) {
        self.background.schedule_after(now, CELEBRATION_DURATION);
        self.spawn.schedule_at(now);
        self.spawned = 0;
    }

    /// Drops every pending timer and live particle. Returns whether anything was in flight.
    pub fn cancel(&mut self) -> bool {
        let in_flight = self.is_in_flight();
        self.background.cancel();
        self.spawn.cancel();
        self.spawned = 0;
        self.particles.clear();
        in_flight
    }

    pub fn is_in_flight(&self) -> bool {
        self.background.is_pending() || self.spawn.is_pending() || !self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Confetti] {
        &self.particles
    }

    pub fn advance<G: Rng>(&mut self, now: Instant, rng: &mut G) -> CelebrationUpdate {
        let mut update = CelebrationUpdate::default();

        while let Some(at) = self.spawn.deadline().filter(|at| *at <= now) {
            self.particles.push(Confetti::random(self.next_id, at, rng));
            self.next_id += 1;
            self.spawned += 1;
            if self.spawned < CONFETTI_COUNT {
                self.spawn.schedule_at(at + CONFETTI_STAGGER);
            } else {
                self.spawn.cancel();
            }
            update.confetti_changed = true;
        }

        let before = self.particles.len();
        self.particles.retain(|c| c.expires_at() > now);
        update.confetti_changed |= self.particles.len() != before;

        update.finished = self.background.fire(now);
        update
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        let expiry = self.particles.iter().map(Confetti::expires_at).min();
        earliest(
            earliest(self.background.deadline(), self.spawn.deadline()),
            expiry,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn spawns_one_particle_per_stagger() {
        let mut rng = StdRng::seed_from_u64(7);
        let t0 = Instant::now();
        let mut celebration = Celebration::default();
        celebration.start(t0);

        let update = celebration.advance(t0, &mut rng);
        assert!(update.confetti_changed);
        assert_eq!(celebration.particles().len(), 1);

        celebration.advance(t0 + 250 * MS, &mut rng);
        assert_eq!(celebration.particles().len(), 3);
        assert_eq!(celebration.next_deadline(), Some(t0 + 300 * MS));
    }

    #[test]
    fn burst_caps_at_confetti_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let t0 = Instant::now();
        let mut celebration = Celebration::default();
        celebration.start(t0);

        celebration.advance(t0 + 4900 * MS, &mut rng);
        assert_eq!(celebration.particles().len(), CONFETTI_COUNT);
        for c in celebration.particles() {
            assert!((0.0..1.0).contains(&c.left));
            assert!((8..=14).contains(&c.size));
            assert!(c.delay < CONFETTI_MAX_DELAY);
        }
    }

    #[test]
    fn background_finishes_and_particles_expire() {
        let mut rng = StdRng::seed_from_u64(2);
        let t0 = Instant::now();
        let mut celebration = Celebration::default();
        celebration.start(t0);
        celebration.advance(t0, &mut rng);

        let update = celebration.advance(t0 + CELEBRATION_DURATION, &mut rng);
        assert!(update.finished);
        assert_eq!(
            celebration.advance(t0 + CELEBRATION_DURATION, &mut rng),
            CelebrationUpdate::default()
        );

        // last spawn at 4.9s lives until 9.9s
        celebration.advance(t0 + 9900 * MS, &mut rng);
        assert!(celebration.particles().is_empty());
        assert!(!celebration.is_in_flight());
        assert_eq!(celebration.next_deadline(), None);
    }

    #[test]
    fn cancel_clears_everything() {
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        let mut celebration = Celebration::default();
        assert!(!celebration.cancel());

        celebration.start(t0);
        celebration.advance(t0 + 500 * MS, &mut rng);
        assert!(celebration.cancel());
        assert!(celebration.particles().is_empty());
        assert_eq!(celebration.next_deadline(), None);
        assert_eq!(
            celebration.advance(t0 + 10_000 * MS, &mut rng),
            CelebrationUpdate::default()
        );
    }

    #[test]
    fn restart_keeps_falling_particles() {
        let mut rng = StdRng::seed_from_u64(4);
        let t0 = Instant::now();
        let mut celebration = Celebration::default();
        celebration.start(t0);
        celebration.advance(t0 + 200 * MS, &mut rng);
        assert_eq!(celebration.particles().len(), 3);

        celebration.start(t0 + 200 * MS);
        celebration.advance(t0 + 200 * MS, &mut rng);
        assert_eq!(celebration.particles().len(), 4);
    }
}
