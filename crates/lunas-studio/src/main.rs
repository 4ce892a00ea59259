use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;

use lunas_engine::logging::{LoggingConfig, init_logging};
use lunas_engine::services::ServiceRegistry;
use lunas_engine::window::{Runtime, RuntimeConfig};
use lunas_engine::{Event, EventKind, GameLoop};

/// Frame statistics shared between the update and draw subscribers.
#[derive(Debug, Default)]
struct Stats {
    frames: u64,
    window_secs: f64,
    window_frames: u32,
}

/// A point bouncing across the surface; stands in for game state.
#[derive(Debug)]
struct Ball {
    x: f64,
    vx: f64,
    width: f64,
}

impl Ball {
    fn step(&mut self, dt: f64) {
        self.x += self.vx * dt;
        if self.x < 0.0 || self.x > self.width {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, self.width);
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = RuntimeConfig {
        title: "Lunas Studio".to_string(),
        pause_on_blur: true,
        ..RuntimeConfig::default()
    };

    Runtime::run(config, setup)
}

fn setup(game: &mut GameLoop) -> Result<()> {
    let mut services = ServiceRegistry::new();
    services.add("stats", Rc::new(RefCell::new(Stats::default())));
    services.add(
        "ball",
        Rc::new(RefCell::new(Ball { x: 0.0, vx: 240.0, width: 1280.0 })),
    );

    let stats = services.get::<RefCell<Stats>>("stats")?;
    let ball = services.get::<RefCell<Ball>>("ball")?;
    game.on(EventKind::Update, move |event, _| {
        let dt = event.dt().unwrap_or_default();
        ball.borrow_mut().step(dt);

        let mut stats = stats.borrow_mut();
        stats.frames += 1;
        stats.window_secs += dt;
        stats.window_frames += 1;
        if stats.window_secs >= 1.0 {
            log::info!(
                "{:.1} fps ({} frames total)",
                f64::from(stats.window_frames) / stats.window_secs,
                stats.frames
            );
            stats.window_secs = 0.0;
            stats.window_frames = 0;
        }
        Ok(())
    });

    let ball = services.get::<RefCell<Ball>>("ball")?;
    game.on(EventKind::Draw, move |_, _| {
        log::trace!("ball at x={:.1}", ball.borrow().x);
        Ok(())
    });

    let ball = services.get::<RefCell<Ball>>("ball")?;
    game.on(EventKind::Resize, move |event, _| {
        if let Event::Resize { width, height } = *event {
            log::info!("surface resized to {width}x{height}");
            ball.borrow_mut().width = f64::from(width);
        }
        Ok(())
    });

    game.on(EventKind::Focus, |_, _| {
        log::info!("focus gained, resuming");
        Ok(())
    });
    game.on(EventKind::Blur, |_, _| {
        log::info!("focus lost, pausing");
        Ok(())
    });

    Ok(())
}
