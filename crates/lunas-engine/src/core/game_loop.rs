use crate::error::LunasError;
use crate::events::{Callback, CallbackRegistry, Event, EventKind, SlotId};
use crate::time::{FrameClock, FrameTime, MonotonicTime, TimeSource};

use super::ctx::{Command, LoopCtx};
use super::host::{Scheduler, Surface, SurfaceProvider, SurfaceRegistry, TickSchedule};

/// Lifecycle of a [`GameLoop`].
///
/// `Stopped` is not terminal: `start()` restarts the loop with a fresh clock
/// baseline, so the first delta after a restart is zero.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Never started; no tick has run and the clock has no baseline.
    Created,
    Running,
    Stopped,
}

/// Loop configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Id of the rendering surface acquired at `start()`.
    pub surface_id: String,

    /// Upper bound on delta time in seconds. `None` reports real elapsed time.
    pub max_dt: Option<f64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            surface_id: "canvas".to_string(),
            max_dt: None,
        }
    }
}

type DiagnosticsHook = Box<dyn FnMut(&LunasError)>;

/// Callback-driven game loop.
///
/// One tick samples the clock, dispatches `update` with the frame's delta time,
/// then dispatches `draw`. `update` always completes (every subscriber, in order)
/// before `draw` begins, and a tick always completes before the next one starts.
///
/// Subscriber errors are isolated: each failure is logged, handed to the
/// diagnostics hook, and dispatch continues with the next subscriber.
pub struct GameLoop {
    config: LoopConfig,
    state: LoopState,
    registry: CallbackRegistry,
    clock: FrameClock,
    time: Box<dyn TimeSource>,
    surfaces: Box<dyn SurfaceProvider>,
    scheduler: Box<dyn Scheduler>,
    surface: Option<Surface>,
    diagnostics: Option<DiagnosticsHook>,
    stop_requested: bool,
}

impl GameLoop {
    pub fn builder() -> GameLoopBuilder {
        GameLoopBuilder::new()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Surface acquired by the last successful `start()`; `None` when not running.
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Read-only view of the subscribers. Mutation goes through the loop.
    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    /// Points `start()` at a different surface. Takes effect on the next start.
    pub fn set_surface_id(&mut self, id: impl Into<String>) {
        self.config.surface_id = id.into();
    }

    pub fn set_diagnostics(&mut self, hook: impl FnMut(&LunasError) + 'static) {
        self.diagnostics = Some(Box::new(hook));
    }

    // ── Subscribers ───────────────────────────────────────────────────────

    pub fn add(&mut self, kind: EventKind, callback: Callback) -> SlotId {
        log::debug!("subscriber added to {kind}");
        self.registry.add(kind, callback)
    }

    /// Removes the first occurrence of `callback` under `kind`. No-op if absent.
    pub fn remove(&mut self, kind: EventKind, callback: &Callback) -> bool {
        let removed = self.registry.remove(kind, callback);
        if removed {
            log::debug!("subscriber removed from {kind}");
        }
        removed
    }

    /// Drops every subscriber of `kind`.
    pub fn clear(&mut self, kind: EventKind) {
        log::debug!("subscribers of {kind} cleared");
        self.registry.clear(kind);
    }

    /// Drops every subscriber of every kind.
    pub fn clear_all(&mut self) {
        log::debug!("all subscribers cleared");
        self.registry.clear_all();
    }

    /// Builds a callback from `f`, subscribes it to `kind` and returns the handle.
    pub fn on<F>(&mut self, kind: EventKind, f: F) -> Callback
    where
        F: FnMut(&Event, &mut LoopCtx) -> anyhow::Result<()> + 'static,
    {
        let callback = Callback::new(f);
        self.add(kind, callback.clone());
        callback
    }

    /// [`add`](Self::add) for hosts that name event kinds by string.
    pub fn add_named(&mut self, kind: &str, callback: Callback) -> Result<SlotId, LunasError> {
        let kind: EventKind = kind.parse()?;
        Ok(self.add(kind, callback))
    }

    /// [`remove`](Self::remove) for hosts that name event kinds by string.
    pub fn remove_named(&mut self, kind: &str, callback: &Callback) -> Result<bool, LunasError> {
        let kind: EventKind = kind.parse()?;
        Ok(self.remove(kind, callback))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Starts (or restarts) the loop.
    ///
    /// Acquires the configured surface, resets the clock baseline to now and
    /// requests the first tick. On `SurfaceNotFound` nothing changes and the loop
    /// stays in its previous state. Starting a running loop is a no-op.
    pub fn start(&mut self) -> Result<(), LunasError> {
        if self.state == LoopState::Running {
            return Ok(());
        }

        let id = self.config.surface_id.as_str();
        let surface = self
            .surfaces
            .acquire(id)
            .ok_or_else(|| LunasError::SurfaceNotFound { id: id.to_string() })?;

        log::info!(
            "game loop starting on surface {} ({}x{})",
            surface.id,
            surface.width,
            surface.height
        );

        self.surface = Some(surface);
        self.clock.reset(self.time.now());
        self.stop_requested = false;
        self.state = LoopState::Running;
        self.scheduler.request_tick();

        Ok(())
    }

    /// Stops a running loop and cancels the pending tick.
    ///
    /// Subscribers call [`LoopCtx::stop`] instead; that request is honoured once
    /// the tick in progress has finished both passes.
    pub fn stop(&mut self) {
        if self.state != LoopState::Running {
            return;
        }

        self.state = LoopState::Stopped;
        self.stop_requested = false;
        self.surface = None;
        self.scheduler.cancel_tick();

        log::info!("game loop stopped");
    }

    /// Runs one frame. Returns the frame's timing, or `None` when not running.
    pub fn tick(&mut self) -> Option<FrameTime> {
        if self.state != LoopState::Running {
            return None;
        }

        let last = self.clock.last_sample();
        let now = self.time.now();
        let ft = self.clock.sample(now);

        if ft.regressed {
            self.report(LunasError::ClockRegression {
                last: last.unwrap_or(now),
                now,
            });
        }

        log::trace!("tick {} dt={:.4}s", ft.frame_index, ft.dt);

        self.run_pass(Event::Update(ft));
        self.run_pass(Event::Draw);

        if self.stop_requested {
            self.stop();
        } else {
            self.scheduler.request_tick();
        }

        Some(ft)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Runs one dispatch pass for `event.kind()`.
    ///
    /// A stop requested by a subscriber during this pass is applied once the
    /// pass completes.
    pub fn dispatch(&mut self, event: Event) {
        self.run_pass(event);

        if self.stop_requested {
            self.stop();
        }
    }

    /// Forwards a host focus change as `onFocus` / `onBlur`.
    pub fn notify_focus(&mut self, focused: bool) {
        self.dispatch(if focused { Event::Focus } else { Event::Blur });
    }

    /// Records the new surface size and dispatches `onResize`.
    pub fn notify_resize(&mut self, width: u32, height: u32) {
        if let Some(surface) = self.surface.as_mut() {
            surface.width = width;
            surface.height = height;
        }
        self.dispatch(Event::Resize { width, height });
    }

    fn run_pass(&mut self, event: Event) {
        let event = clamp_update(event);
        let kind = event.kind();

        for (id, callback) in self.registry.snapshot(kind) {
            // Removed by an earlier subscriber in this pass.
            if !self.registry.is_live(kind, id) {
                continue;
            }

            let mut ctx = LoopCtx::new(self.state, kind, id);
            if let Err(error) = callback.invoke(&event, &mut ctx) {
                self.report(LunasError::SubscriberFailure { kind, error });
            }
            self.apply(ctx);
        }
    }

    fn apply(&mut self, ctx: LoopCtx) {
        for cmd in ctx.into_commands() {
            match cmd {
                Command::Add(kind, callback) => {
                    self.add(kind, callback);
                }
                Command::Remove(kind, callback) => {
                    self.remove(kind, &callback);
                }
                Command::RemoveSlot(kind, id) => {
                    if self.registry.remove_slot(kind, id) {
                        log::debug!("subscriber removed itself from {kind}");
                    }
                }
                Command::Stop => {
                    if self.state == LoopState::Running {
                        self.stop_requested = true;
                    }
                }
            }
        }
    }

    fn report(&mut self, err: LunasError) {
        log::warn!("{err}");
        if let Some(hook) = self.diagnostics.as_mut() {
            hook(&err);
        }
    }
}

/// Host-built `Update` events bypass the clock, so their delta is clamped here too.
fn clamp_update(event: Event) -> Event {
    match event {
        Event::Update(mut ft) if ft.dt.is_nan() || ft.dt < 0.0 => {
            log::debug!("clamping update dt {} to 0", ft.dt);
            ft.dt = 0.0;
            ft.regressed = true;
            Event::Update(ft)
        }
        other => other,
    }
}

/// Assembles a [`GameLoop`] from its collaborators.
///
/// Unset collaborators default to a wall-clock [`MonotonicTime`], an empty
/// [`SurfaceRegistry`] and a fresh [`TickSchedule`].
pub struct GameLoopBuilder {
    config: LoopConfig,
    time: Option<Box<dyn TimeSource>>,
    surfaces: Option<Box<dyn SurfaceProvider>>,
    scheduler: Option<Box<dyn Scheduler>>,
    diagnostics: Option<DiagnosticsHook>,
}

impl GameLoopBuilder {
    pub fn new() -> Self {
        Self {
            config: LoopConfig::default(),
            time: None,
            surfaces: None,
            scheduler: None,
            diagnostics: None,
        }
    }

    pub fn config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Id of the surface to acquire at `start()`.
    pub fn surface(mut self, id: impl Into<String>) -> Self {
        self.config.surface_id = id.into();
        self
    }

    /// Clamp delta time to at most `max_dt` seconds.
    pub fn max_dt(mut self, max_dt: f64) -> Self {
        self.config.max_dt = Some(max_dt);
        self
    }

    pub fn time_source(mut self, time: impl TimeSource + 'static) -> Self {
        self.time = Some(Box::new(time));
        self
    }

    pub fn surface_provider(mut self, provider: impl SurfaceProvider + 'static) -> Self {
        self.surfaces = Some(Box::new(provider));
        self
    }

    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn diagnostics(mut self, hook: impl FnMut(&LunasError) + 'static) -> Self {
        self.diagnostics = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> GameLoop {
        let time = self
            .time
            .unwrap_or_else(|| Box::new(MonotonicTime::new()));

        let clock = match self.config.max_dt {
            Some(max) => FrameClock::with_max_dt(time.unit(), max),
            None => FrameClock::new(time.unit()),
        };

        GameLoop {
            config: self.config,
            state: LoopState::Created,
            registry: CallbackRegistry::new(),
            clock,
            time,
            surfaces: self
                .surfaces
                .unwrap_or_else(|| Box::new(SurfaceRegistry::new())),
            scheduler: self
                .scheduler
                .unwrap_or_else(|| Box::new(TickSchedule::new())),
            surface: None,
            diagnostics: self.diagnostics,
            stop_requested: false,
        }
    }
}

impl Default for GameLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
