//! One cooperative loop that ticks every actor at its own interval.
//!
//! All actors share a single lock: a frame takes it once, ticks whoever is
//! due in registration order, and releases it. Nothing can move while another
//! actor is deciding. Stopping is cooperative through a [`CancelToken`]; the
//! token is checked again under the lock before each tick, so once it is
//! cancelled no further move is applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SchedulerError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorId {
    Player,
    Ghost(usize),
}

/// Something the scheduler drives.
pub trait Tickable {
    fn tick(&mut self, actor: ActorId);

    /// Returning `true` ends the run loop after the current frame.
    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    actor: ActorId,
    interval: Duration,
    since: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    slots: Vec<Slot>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `actor` to tick every `interval`. Re-registering replaces the interval.
    pub fn every(&mut self, actor: ActorId, interval: Duration) -> &mut Self {
        match self.slots.iter_mut().find(|s| s.actor == actor) {
            Some(slot) => slot.interval = interval,
            None => self.slots.push(Slot {
                actor,
                interval,
                since: Duration::ZERO,
            }),
        }
        self
    }

    /// Advances the clock by `dt` and returns the actors that came due, in
    /// registration order. An actor ticks at most once per call.
    pub fn due(&mut self, dt: Duration) -> Vec<ActorId> {
        let mut out = Vec::new();
        for slot in &mut self.slots {
            slot.since += dt;
            if slot.since >= slot.interval {
                slot.since = slot.since.saturating_sub(slot.interval).min(slot.interval);
                out.push(slot.actor);
            }
        }
        out
    }

    /// Runs until `token` is cancelled or the target reports it is finished.
    pub fn run<T: Tickable>(
        &mut self,
        target: &Mutex<T>,
        token: &CancelToken,
        frame: Duration,
    ) -> Result<(), SchedulerError> {
        while !token.is_cancelled() {
            thread::sleep(frame);
            let due = self.due(frame);
            if due.is_empty() {
                continue;
            }

            let mut state = target.lock().map_err(|_| {
                warn!("scheduler stopping: state lock poisoned");
                SchedulerError::Poisoned
            })?;
            for actor in due {
                if token.is_cancelled() {
                    break;
                }
                state.tick(actor);
            }
            if state.is_finished() {
                debug!("target finished, scheduler stopping");
                token.cancel();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        log: Vec<ActorId>,
        limit: Option<usize>,
    }

    impl Tickable for Recorder {
        fn tick(&mut self, actor: ActorId) {
            self.log.push(actor);
        }

        fn is_finished(&self) -> bool {
            self.limit.is_some_and(|n| self.log.len() >= n)
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn actors_tick_at_their_own_rate() {
        let mut sched = Scheduler::new();
        sched
            .every(ActorId::Player, ms(10))
            .every(ActorId::Ghost(0), ms(20));

        let mut ticks = Vec::new();
        for _ in 0..4 {
            ticks.push(sched.due(ms(10)));
        }
        assert_eq!(
            ticks,
            vec![
                vec![ActorId::Player],
                vec![ActorId::Player, ActorId::Ghost(0)],
                vec![ActorId::Player],
                vec![ActorId::Player, ActorId::Ghost(0)],
            ]
        );
    }

    #[test]
    fn long_frames_do_not_burst() {
        let mut sched = Scheduler::new();
        sched.every(ActorId::Player, ms(10));
        assert_eq!(sched.due(ms(55)), vec![ActorId::Player]);
        // leftover is capped at one interval
        assert_eq!(sched.due(ms(0)), vec![ActorId::Player]);
        assert_eq!(sched.due(ms(0)), Vec::<ActorId>::new());
    }

    #[test]
    fn reregistering_updates_interval() {
        let mut sched = Scheduler::new();
        sched.every(ActorId::Ghost(1), ms(50));
        sched.every(ActorId::Ghost(1), ms(5));
        assert_eq!(sched.due(ms(5)), vec![ActorId::Ghost(1)]);
    }

    #[test]
    fn cancelled_token_applies_nothing() {
        let state = Mutex::new(Recorder::default());
        let token = CancelToken::new();
        token.cancel();
        let mut sched = Scheduler::new();
        sched.every(ActorId::Player, ms(1));
        sched.run(&state, &token, ms(1)).unwrap();
        assert!(state.lock().unwrap().log.is_empty());
    }

    #[test]
    fn finished_target_stops_the_loop() {
        let state = Mutex::new(Recorder {
            limit: Some(3),
            ..Recorder::default()
        });
        let token = CancelToken::new();
        let mut sched = Scheduler::new();
        sched.every(ActorId::Player, ms(1));
        sched.run(&state, &token, ms(1)).unwrap();
        assert!(token.is_cancelled());
        assert_eq!(state.lock().unwrap().log.len(), 3);
    }

    #[test]
    fn cancel_from_another_thread() {
        let state = Arc::new(Mutex::new(Recorder::default()));
        let token = CancelToken::new();

        let worker = {
            let state = Arc::clone(&state);
            let token = token.clone();
            thread::spawn(move || {
                let mut sched = Scheduler::new();
                sched.every(ActorId::Player, ms(1)).every(ActorId::Ghost(0), ms(2));
                sched.run(&state, &token, ms(1))
            })
        };

        thread::sleep(ms(30));
        token.cancel();
        worker.join().unwrap().unwrap();

        let frozen = state.lock().unwrap().log.len();
        thread::sleep(ms(10));
        assert_eq!(state.lock().unwrap().log.len(), frozen);
    }

    #[test]
    fn poisoned_lock_is_reported() {
        let state = Arc::new(Mutex::new(Recorder::default()));
        {
            let state = Arc::clone(&state);
            let _ = thread::spawn(move || {
                let _guard = state.lock().unwrap();
                panic!("poison");
            })
            .join();
        }
        let token = CancelToken::new();
        let mut sched = Scheduler::new();
        sched.every(ActorId::Player, ms(1));
        assert_eq!(
            sched.run(&state, &token, ms(1)),
            Err(SchedulerError::Poisoned)
        );
    }
}
