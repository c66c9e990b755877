// Token rotation: keeps a freshly issued attendance token on display for one batch.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

use crate::domain::{
    RotationSettingsError, RotationState, SESSION_TOKEN_KEY, SessionStore, StoreError, Token,
    TokenIssuer,
};

/// Seconds a token stays on display before it is reissued.
pub const TOKEN_ROTATION_INTERVAL_SECS: u32 = 10;

/// Timing knobs for the rotation loop.
#[derive(Debug, Clone)]
pub struct RotationSettings {
    interval_seconds: u32,
    tick: Duration,
    grace: Duration,
}

impl RotationSettings {
    /// `interval_seconds` is the countdown length in ticks; `grace` is the pause
    /// between countdown expiry and the next issuance request.
    pub fn new(
        interval_seconds: u32,
        tick: Duration,
        grace: Duration,
    ) -> Result<Self, RotationSettingsError> {
        if interval_seconds == 0 {
            return Err(RotationSettingsError::ZeroInterval);
        }
        if tick.is_zero() {
            return Err(RotationSettingsError::ZeroTick);
        }
        Ok(Self {
            interval_seconds,
            tick,
            grace,
        })
    }

    pub fn interval_seconds(&self) -> u32 {
        self.interval_seconds
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            interval_seconds: TOKEN_ROTATION_INTERVAL_SECS,
            tick: Duration::from_secs(1),
            grace: Duration::from_secs(1),
        }
    }
}

// State shared between the controller and its spawned tasks.
struct RotationShared {
    batch_name: String,
    settings: RotationSettings,
    issuer: Arc<dyn TokenIssuer>,
    store: Arc<dyn SessionStore>,
    state_tx: watch::Sender<RotationState>,
}

enum Countdown {
    Running(u32),
    Expired,
    Stale,
}

impl RotationShared {
    // Opens a new issuance cycle for the given activation, returning its generation.
    fn begin_cycle(&self, epoch: u64) -> Option<u64> {
        let mut generation = None;
        self.state_tx.send_if_modified(|state| {
            if !state.active || state.epoch != epoch {
                return false;
            }
            state.generation += 1;
            generation = Some(state.generation);
            true
        });
        generation
    }

    fn countdown(&self, epoch: u64) -> Countdown {
        let mut outcome = Countdown::Stale;
        self.state_tx.send_if_modified(|state| {
            if !state.active || state.epoch != epoch {
                return false;
            }
            if state.seconds_remaining <= 1 {
                state.is_regenerating = true;
                outcome = Countdown::Expired;
            } else {
                state.seconds_remaining -= 1;
                outcome = Countdown::Running(state.seconds_remaining);
            }
            true
        });
        outcome
    }

    fn finish_regeneration(&self, epoch: u64) -> bool {
        let interval = self.settings.interval_seconds;
        self.state_tx.send_if_modified(|state| {
            if !state.active || state.epoch != epoch {
                return false;
            }
            state.is_regenerating = false;
            state.seconds_remaining = interval;
            true
        })
    }

    // Applies a token only if its cycle is still the current one. The stored
    // copy is written under the same state lock, so a superseded cycle can
    // never write after a newer cycle has cleared the key.
    fn apply_token(&self, generation: u64, token: &Token) -> Option<Result<(), StoreError>> {
        let mut persisted = None;
        self.state_tx.send_if_modified(|state| {
            if !state.active || state.generation != generation {
                return false;
            }
            state.current_token = Some(token.clone());
            persisted = Some(self.store.set(SESSION_TOKEN_KEY, token.as_str()));
            true
        });
        persisted
    }

    fn is_current(&self, generation: u64) -> bool {
        let state = self.state_tx.borrow();
        state.active && state.generation == generation
    }
}

// One issuance cycle: clear the stored token, request a new one, publish it.
async fn run_issuance_cycle(shared: Arc<RotationShared>, generation: u64) {
    if let Err(e) = shared.store.remove(SESSION_TOKEN_KEY) {
        warn!(batch = %shared.batch_name, error = %e, "failed to clear stored token");
    }

    match shared.issuer.issue_token(&shared.batch_name).await {
        Ok(token) => match shared.apply_token(generation, &token) {
            None => {
                debug!(
                    batch = %shared.batch_name,
                    generation,
                    "discarding token from superseded cycle"
                );
            }
            Some(persisted) => {
                if let Err(e) = persisted {
                    warn!(batch = %shared.batch_name, error = %e, "failed to persist token");
                }
                info!(batch = %shared.batch_name, generation, "attendance token issued");
            }
        },
        Err(e) if shared.is_current(generation) => {
            // The display keeps the last good token; the next cycle retries.
            error!(
                batch = %shared.batch_name,
                generation,
                error = %e,
                "failed to issue attendance token"
            );
        }
        Err(e) => {
            debug!(
                batch = %shared.batch_name,
                generation,
                error = %e,
                "ignoring failure from superseded cycle"
            );
        }
    }
}

// Countdown loop for one activation. Owns both the repeating tick and the
// one-shot grace delay, so aborting this task cancels both.
async fn run_ticker(shared: Arc<RotationShared>, epoch: u64) {
    let tick = shared.settings.tick;
    let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        match shared.countdown(epoch) {
            Countdown::Stale => break,
            Countdown::Running(seconds_remaining) => {
                trace!(batch = %shared.batch_name, seconds_remaining, "countdown tick");
            }
            Countdown::Expired => {
                debug!(batch = %shared.batch_name, "countdown expired; regenerating");
                tokio::time::sleep(shared.settings.grace).await;

                let Some(generation) = shared.begin_cycle(epoch) else {
                    break;
                };
                // Spawned so an abort of this loop leaves the request to finish on its own.
                let cycle = tokio::spawn(run_issuance_cycle(shared.clone(), generation));
                if let Err(e) = cycle.await {
                    warn!(batch = %shared.batch_name, error = %e, "issuance task failed");
                }

                if !shared.finish_regeneration(epoch) {
                    break;
                }
                interval.reset();
            }
        }
    }
}

/// Cancellation handle for the timers of one activation. Dropping it cancels them.
struct RotationTimers {
    ticker: JoinHandle<()>,
}

impl Drop for RotationTimers {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

/// Drives the rotating attendance token for a single batch.
///
/// `activate` issues a token right away and starts a one second countdown.
/// When the countdown runs out the controller shows a regenerating state for
/// one grace period, issues a new token and restarts the countdown.
/// `deactivate` cancels every timer at once and clears the displayed token;
/// a request still in flight may finish but its result is dropped.
///
/// Must be activated from within a Tokio runtime.
pub struct TokenRotationController {
    shared: Arc<RotationShared>,
    timers: Mutex<Option<RotationTimers>>,
}

impl TokenRotationController {
    pub fn new(
        batch_name: impl Into<String>,
        settings: RotationSettings,
        issuer: Arc<dyn TokenIssuer>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let (state_tx, _state_rx) =
            watch::channel(RotationState::idle(settings.interval_seconds));
        Self {
            shared: Arc::new(RotationShared {
                batch_name: batch_name.into(),
                settings,
                issuer,
                store,
                state_tx,
            }),
            timers: Mutex::new(None),
        }
    }

    pub fn batch_name(&self) -> &str {
        &self.shared.batch_name
    }

    /// Receiver that observes every state change, for the display surface.
    pub fn subscribe(&self) -> watch::Receiver<RotationState> {
        self.shared.state_tx.subscribe()
    }

    pub fn snapshot(&self) -> RotationState {
        self.shared.state_tx.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.shared.state_tx.borrow().active
    }

    /// Shows the token display. Returns false if it was already active.
    pub fn activate(&self) -> bool {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        let interval = self.shared.settings.interval_seconds;

        let mut started = None;
        self.shared.state_tx.send_if_modified(|state| {
            if state.active {
                return false;
            }
            state.active = true;
            state.epoch += 1;
            state.generation += 1;
            state.seconds_remaining = interval;
            state.is_regenerating = false;
            started = Some((state.epoch, state.generation));
            true
        });
        let Some((epoch, generation)) = started else {
            debug!(batch = %self.shared.batch_name, "token rotation already active");
            return false;
        };

        tokio::spawn(run_issuance_cycle(self.shared.clone(), generation));
        *timers = Some(RotationTimers {
            ticker: tokio::spawn(run_ticker(self.shared.clone(), epoch)),
        });

        info!(batch = %self.shared.batch_name, epoch, "token rotation activated");
        true
    }

    /// Hides the token display and cancels all timers. Safe to call in any state.
    pub fn deactivate(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(PoisonError::into_inner);
        drop(timers.take());

        let interval = self.shared.settings.interval_seconds;
        let stopped = self.shared.state_tx.send_if_modified(|state| {
            if !state.active {
                return false;
            }
            state.active = false;
            state.generation += 1;
            state.seconds_remaining = interval;
            state.is_regenerating = false;
            state.current_token = None;
            true
        });
        if stopped {
            info!(batch = %self.shared.batch_name, "token rotation deactivated");
        }
    }

    /// Flips the display on or off, returning the new active flag.
    pub fn toggle(&self) -> bool {
        if self.is_active() {
            self.deactivate();
            false
        } else {
            self.activate()
        }
    }
}

impl Drop for TokenRotationController {
    fn drop(&mut self) {
        self.deactivate();
    }
}
