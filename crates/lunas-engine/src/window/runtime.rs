use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{GameLoop, LoopConfig, Surface, SurfaceRegistry, TickSchedule};
use crate::time::FrameTime;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub loop_config: LoopConfig,

    /// Stop the loop when the window loses focus and restart it on focus.
    pub pause_on_blur: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "lunas".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            loop_config: LoopConfig::default(),
            pause_on_blur: false,
        }
    }
}

/// Hosts a [`GameLoop`] in a winit window.
///
/// The runtime plays every host role the loop needs: it publishes the window as
/// the configured surface, turns tick requests into redraw requests, and forwards
/// focus and resize notifications.
pub struct Runtime;

impl Runtime {
    /// Builds the loop, lets `setup` register subscribers, then runs until the
    /// window closes.
    ///
    /// A `start()` failure (e.g. `SurfaceNotFound`) ends the run and is returned.
    pub fn run<F>(config: RuntimeConfig, setup: F) -> Result<()>
    where
        F: FnOnce(&mut GameLoop) -> Result<()>,
    {
        let surfaces = SurfaceRegistry::new();
        let ticks = TickSchedule::new();

        let mut game = GameLoop::builder()
            .config(config.loop_config.clone())
            .surface_provider(surfaces.clone())
            .scheduler(ticks.clone())
            .build();

        setup(&mut game).context("game setup failed")?;

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut host = Host::new(config, game, surfaces, ticks);

        event_loop
            .run_app(&mut host)
            .context("winit event loop terminated with error")?;

        match host.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Host {
    config: RuntimeConfig,
    game: GameLoop,
    surfaces: SurfaceRegistry,
    ticks: TickSchedule,
    window: Option<Window>,
    paused_by_blur: bool,
    error: Option<anyhow::Error>,
}

impl Host {
    fn new(config: RuntimeConfig, game: GameLoop, surfaces: SurfaceRegistry, ticks: TickSchedule) -> Self {
        Self {
            config,
            game,
            surfaces,
            ticks,
            window: None,
            paused_by_blur: false,
            error: None,
        }
    }

    fn surface_id(&self) -> &str {
        &self.config.loop_config.surface_id
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.game.stop();
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let size = window.inner_size();
        self.surfaces
            .insert(Surface::new(self.surface_id(), size.width, size.height));
        self.window = Some(window);

        Ok(())
    }

    fn on_focus(&mut self, focused: bool) {
        if !self.config.pause_on_blur {
            self.game.notify_focus(focused);
            return;
        }

        if focused {
            if self.paused_by_blur {
                self.paused_by_blur = false;
                if let Err(e) = self.game.start() {
                    log::error!("failed to resume game loop: {e}");
                }
            }
            self.game.notify_focus(true);
        } else {
            self.game.notify_focus(false);
            if self.game.is_running() {
                self.game.stop();
                self.paused_by_blur = true;
            }
        }
    }
}

/// Ticks only when the loop asked for it.
///
/// The platform also redraws on expose, resize and restore; those must not
/// advance the simulation.
fn drive_redraw(game: &mut GameLoop, ticks: &TickSchedule) -> Option<FrameTime> {
    if ticks.take() { game.tick() } else { None }
}

impl ApplicationHandler for Host {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        if let Err(e) = self.game.start() {
            self.fail(event_loop, anyhow::Error::from(e).context("failed to start game loop"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if self.ticks.is_pending() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|w| w.id()) != Some(window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.game.stop();
                let id = self.surface_id().to_string();
                self.surfaces.remove(&id);
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                let id = self.surface_id().to_string();
                self.surfaces.resize(&id, size.width, size.height);
                self.game.notify_resize(size.width, size.height);
            }

            WindowEvent::Focused(focused) => self.on_focus(focused),

            WindowEvent::RedrawRequested => {
                drive_redraw(&mut self.game, &self.ticks);
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::core::LoopState;
    use crate::events::EventKind;
    use crate::time::{ManualTime, TimeUnit};

    fn hosted_loop(ticks: &TickSchedule) -> GameLoop {
        let surfaces = SurfaceRegistry::new();
        surfaces.insert(Surface::new("canvas", 320, 240));
        GameLoop::builder()
            .time_source(ManualTime::new(TimeUnit::Milliseconds))
            .surface_provider(surfaces)
            .scheduler(ticks.clone())
            .build()
    }

    #[test]
    fn unrequested_redraw_does_not_tick() {
        let ticks = TickSchedule::new();
        let mut game = hosted_loop(&ticks);
        let updates = Rc::new(Cell::new(0));
        let count = updates.clone();
        game.on(EventKind::Update, move |_, _| {
            count.set(count.get() + 1);
            Ok(())
        });
        game.start().unwrap();

        assert!(drive_redraw(&mut game, &ticks).is_some());
        assert_eq!(updates.get(), 1);

        // Consumed by the tick above, then re-armed by it.
        assert!(ticks.take());
        assert!(drive_redraw(&mut game, &ticks).is_none());
        assert!(drive_redraw(&mut game, &ticks).is_none());
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn redraw_after_stop_does_not_tick() {
        let ticks = TickSchedule::new();
        let mut game = hosted_loop(&ticks);
        game.start().unwrap();
        game.stop();

        assert!(drive_redraw(&mut game, &ticks).is_none());
        assert_eq!(game.state(), LoopState::Stopped);
    }
}
