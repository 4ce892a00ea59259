use std::cell::RefCell;
use std::rc::Rc;

use lunas_engine::core::{Surface, SurfaceRegistry, TickSchedule};
use lunas_engine::time::{FrameTime, ManualTime, TimeUnit};
use lunas_engine::{Callback, Event, EventKind, GameLoop, LoopState, LunasError};

type Log = Rc<RefCell<Vec<String>>>;

struct Harness {
    game: GameLoop,
    time: ManualTime,
    surfaces: SurfaceRegistry,
    ticks: TickSchedule,
    diagnostics: Rc<RefCell<Vec<String>>>,
}

fn harness() -> Harness {
    let time = ManualTime::new(TimeUnit::Milliseconds);
    let surfaces = SurfaceRegistry::new();
    let ticks = TickSchedule::new();
    let diagnostics = Rc::new(RefCell::new(Vec::new()));

    let sink = diagnostics.clone();
    let game = GameLoop::builder()
        .time_source(time.clone())
        .surface_provider(surfaces.clone())
        .scheduler(ticks.clone())
        .diagnostics(move |err: &LunasError| sink.borrow_mut().push(err.to_string()))
        .build();

    Harness { game, time, surfaces, ticks, diagnostics }
}

fn running() -> Harness {
    let mut h = harness();
    h.surfaces.insert(Surface::new("canvas", 800, 600));
    h.game.start().unwrap();
    h
}

/// Subscriber that appends `tag` to `log` on every invocation.
fn recorder(log: &Log, tag: &str) -> Callback {
    let log = log.clone();
    let tag = tag.to_string();
    Callback::new(move |_, _| {
        log.borrow_mut().push(tag.clone());
        Ok(())
    })
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ── Ordering ──────────────────────────────────────────────────────────────

#[test]
fn update_completes_before_draw_every_tick() {
    let mut h = running();
    let log: Log = Rc::default();

    h.game.add(EventKind::Update, recorder(&log, "update-a"));
    h.game.add(EventKind::Draw, recorder(&log, "draw-a"));
    h.game.add(EventKind::Update, recorder(&log, "update-b"));
    h.game.add(EventKind::Draw, recorder(&log, "draw-b"));

    for _ in 0..3 {
        h.time.advance(16.0);
        h.game.tick().unwrap();
    }

    let expected: Vec<String> = ["update-a", "update-b", "draw-a", "draw-b"]
        .iter()
        .cycle()
        .take(12)
        .map(|s| s.to_string())
        .collect();
    assert_eq!(entries(&log), expected);
}

#[test]
fn update_receives_delta_seconds() {
    let mut h = harness();
    h.surfaces.insert(Surface::new("canvas", 1, 1));
    h.time.set(1_000.0);
    h.game.start().unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    h.game.on(EventKind::Update, move |event, _| {
        sink.borrow_mut().push(event.dt().unwrap());
        Ok(())
    });

    h.game.tick();
    h.time.set(1_020.0);
    h.game.tick();

    let seen = seen.borrow();
    assert_eq!(seen[0], 0.0);
    assert!((seen[1] - 0.02).abs() < 1e-9);
}

#[test]
fn tick_requests_the_next_tick() {
    let mut h = running();
    assert!(h.ticks.take());
    h.game.tick();
    assert!(h.ticks.take());
}

// ── Clock ─────────────────────────────────────────────────────────────────

#[test]
fn clock_regression_never_reaches_subscribers_as_negative() {
    let mut h = harness();
    h.surfaces.insert(Surface::new("canvas", 1, 1));
    h.time.set(500.0);
    h.game.start().unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    h.game.on(EventKind::Update, move |event, _| {
        sink.borrow_mut().push(event.dt().unwrap());
        Ok(())
    });

    for now in [510.0, 400.0, 400.0, 530.0] {
        h.time.set(now);
        h.game.tick();
    }

    let seen = seen.borrow();
    assert!(seen.iter().all(|dt| *dt >= 0.0));
    assert_eq!(seen[1], 0.0);
    assert_eq!(seen[2], 0.0);
    // Measured from the retained 510 baseline.
    assert!((seen[3] - 0.02).abs() < 1e-9);

    let diags = h.diagnostics.borrow();
    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| d.contains("clock regressed")));
}

#[test]
fn dispatched_update_never_carries_negative_delta() {
    let mut h = running();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    h.game.on(EventKind::Update, move |event, _| {
        sink.borrow_mut().push(event.dt().unwrap());
        Ok(())
    });

    for dt in [-0.5, f64::NAN, 0.25] {
        h.game.dispatch(Event::Update(FrameTime {
            dt,
            now: 0.0,
            frame_index: 0,
            regressed: false,
        }));
    }

    assert_eq!(*seen.borrow(), vec![0.0, 0.0, 0.25]);
}

// ── Add / remove ──────────────────────────────────────────────────────────

#[test]
fn removed_callback_is_not_invoked() {
    let mut h = running();
    let log: Log = Rc::default();
    let cb = recorder(&log, "cb");

    h.game.add(EventKind::Update, cb.clone());
    assert!(h.game.remove(EventKind::Update, &cb));
    h.game.tick();

    assert!(entries(&log).is_empty());
}

#[test]
fn removing_absent_callback_is_noop() {
    let mut h = running();
    let log: Log = Rc::default();
    h.game.add(EventKind::Update, recorder(&log, "kept"));

    let stranger = recorder(&log, "stranger");
    assert!(!h.game.remove(EventKind::Update, &stranger));
    assert_eq!(h.game.registry().len(EventKind::Update), 1);

    h.game.tick();
    assert_eq!(entries(&log), vec!["kept"]);
}

#[test]
fn duplicate_callback_runs_once_per_occurrence() {
    let mut h = running();
    let log: Log = Rc::default();
    let twice = recorder(&log, "twice");
    let between = recorder(&log, "between");

    h.game.add(EventKind::Update, twice.clone());
    h.game.add(EventKind::Update, between.clone());
    h.game.add(EventKind::Update, twice.clone());
    h.game.tick();
    assert_eq!(entries(&log), vec!["twice", "between", "twice"]);

    // Only the first occurrence goes.
    log.borrow_mut().clear();
    h.game.remove(EventKind::Update, &twice);
    h.game.tick();
    assert_eq!(entries(&log), vec!["between", "twice"]);
}

#[test]
fn clear_drops_subscribers_of_one_kind_or_all() {
    let mut h = running();
    let log: Log = Rc::default();
    let draw = recorder(&log, "draw");
    h.game.add(EventKind::Update, recorder(&log, "update"));
    h.game.add(EventKind::Draw, draw.clone());
    h.game.add(EventKind::Resize, recorder(&log, "resize"));

    h.game.clear(EventKind::Update);
    h.game.tick();
    assert_eq!(entries(&log), vec!["draw"]);
    assert!(h.game.registry().contains(EventKind::Draw, &draw));

    h.game.clear_all();
    h.game.tick();
    h.game.notify_resize(5, 5);
    assert_eq!(entries(&log), vec!["draw"]);
    assert!(EventKind::ALL.into_iter().all(|k| h.game.registry().is_empty(k)));
}

#[test]
fn named_kinds_resolve_and_reject_unknown_names() {
    let mut h = running();
    let log: Log = Rc::default();
    let cb = recorder(&log, "focus");

    h.game.add_named("onFocus", cb.clone()).unwrap();
    h.game.notify_focus(true);
    assert_eq!(entries(&log), vec!["focus"]);

    let err = h.game.add_named("onScroll", cb.clone()).unwrap_err();
    assert!(matches!(err, LunasError::InvalidEventKind(_)));
    assert!(h.game.remove_named("onHover", &cb).is_err());
    assert!(h.game.remove_named("onFocus", &cb).unwrap());
}

// ── Mutation during dispatch ──────────────────────────────────────────────

#[test]
fn callback_added_during_pass_waits_for_next_pass() {
    let mut h = running();
    let log: Log = Rc::default();
    let late = recorder(&log, "late");

    let added = Rc::new(RefCell::new(false));
    let (flag, to_add, outer_log) = (added.clone(), late.clone(), log.clone());
    h.game.on(EventKind::Update, move |_, ctx| {
        outer_log.borrow_mut().push("adder".into());
        if !*flag.borrow() {
            *flag.borrow_mut() = true;
            ctx.add(EventKind::Update, to_add.clone());
        }
        Ok(())
    });

    h.game.tick();
    assert_eq!(entries(&log), vec!["adder"]);

    h.game.tick();
    assert_eq!(entries(&log), vec!["adder", "adder", "late"]);
}

#[test]
fn callback_removing_itself_finishes_pass_and_stays_removed() {
    let mut h = running();
    let log: Log = Rc::default();

    // State only the subscriber owns; freed once the subscriber is.
    let owned = Rc::new(());
    let watch = Rc::downgrade(&owned);

    let self_log = log.clone();
    h.game.on(EventKind::Update, move |_, ctx| {
        let _keep = &owned;
        self_log.borrow_mut().push("once".into());
        ctx.remove_current();
        Ok(())
    });
    h.game.add(EventKind::Update, recorder(&log, "after"));

    h.game.tick();
    h.game.tick();

    assert_eq!(entries(&log), vec!["once", "after", "after"]);
    assert_eq!(h.game.registry().len(EventKind::Update), 1);

    drop(h);
    assert!(watch.upgrade().is_none());
}

#[test]
fn remove_current_keeps_other_occurrences() {
    let mut h = running();
    let count = Rc::new(RefCell::new(0));

    let hits = count.clone();
    let cb = Callback::new(move |_, ctx| {
        *hits.borrow_mut() += 1;
        if *hits.borrow() == 1 {
            ctx.remove_current();
        }
        Ok(())
    });
    h.game.add(EventKind::Draw, cb.clone());
    h.game.add(EventKind::Draw, cb.clone());

    h.game.tick();
    assert_eq!(*count.borrow(), 2);
    assert!(h.game.registry().contains(EventKind::Draw, &cb));

    h.game.tick();
    assert_eq!(*count.borrow(), 3);
}

#[test]
fn sibling_removed_before_its_turn_is_skipped() {
    let mut h = running();
    let log: Log = Rc::default();
    let victim = recorder(&log, "victim");
    let bystander = recorder(&log, "bystander");

    let target = victim.clone();
    h.game.on(EventKind::Draw, move |_, ctx| {
        ctx.remove(EventKind::Draw, &target);
        Ok(())
    });
    h.game.add(EventKind::Draw, victim);
    h.game.add(EventKind::Draw, bystander);

    h.game.tick();
    assert_eq!(entries(&log), vec!["bystander"]);
}

// ── Start / stop ──────────────────────────────────────────────────────────

#[test]
fn start_without_surface_then_with_surface() {
    let mut h = harness();

    let err = h.game.start().unwrap_err();
    assert!(matches!(err, LunasError::SurfaceNotFound { .. }));
    assert_eq!(h.game.state(), LoopState::Created);
    assert_eq!(h.game.tick(), None);

    h.surfaces.insert(Surface::new("canvas", 640, 360));
    h.game.start().unwrap();
    assert_eq!(h.game.state(), LoopState::Running);
}

#[test]
fn start_fails_for_unknown_configured_surface() {
    let mut h = harness();
    h.surfaces.insert(Surface::new("canvas", 1, 1));
    h.game.set_surface_id("minimap");

    let err = h.game.start().unwrap_err();
    assert_eq!(err.to_string(), "rendering surface not found: minimap");
    assert_eq!(h.game.state(), LoopState::Created);
}

#[test]
fn stop_during_update_finishes_the_tick_then_halts() {
    let mut h = running();
    let log: Log = Rc::default();

    let update_log = log.clone();
    h.game.on(EventKind::Update, move |_, ctx| {
        update_log.borrow_mut().push("update".into());
        ctx.stop();
        assert_eq!(ctx.state(), LoopState::Running);
        Ok(())
    });
    h.game.add(EventKind::Update, recorder(&log, "update-2"));
    h.game.add(EventKind::Draw, recorder(&log, "draw"));

    assert!(h.game.tick().is_some());
    assert_eq!(entries(&log), vec!["update", "update-2", "draw"]);
    assert_eq!(h.game.state(), LoopState::Stopped);
    assert!(!h.ticks.is_pending());

    assert_eq!(h.game.tick(), None);
    assert_eq!(entries(&log).len(), 3);
}

#[test]
fn restart_after_stop_resets_delta() {
    let mut h = running();
    h.time.set(100.0);
    h.game.tick();

    h.game.stop();
    h.time.set(10_000.0);
    h.game.start().unwrap();
    assert!(h.ticks.is_pending());

    let ft = h.game.tick().unwrap();
    assert_eq!(ft.dt, 0.0);
    assert_eq!(ft.frame_index, 0);
}

#[test]
fn stop_from_focus_handler_applies_after_pass() {
    let mut h = running();
    let log: Log = Rc::default();

    h.game.on(EventKind::Blur, |_, ctx| {
        ctx.stop();
        Ok(())
    });
    h.game.add(EventKind::Blur, recorder(&log, "blur-2"));

    h.game.notify_focus(false);
    assert_eq!(entries(&log), vec!["blur-2"]);
    assert_eq!(h.game.state(), LoopState::Stopped);
}

// ── Failure isolation ─────────────────────────────────────────────────────

#[test]
fn failing_draw_subscriber_does_not_block_siblings() {
    let mut h = running();
    let log: Log = Rc::default();

    h.game.on(EventKind::Draw, |_, _| anyhow::bail!("texture atlas missing"));
    h.game.add(EventKind::Draw, recorder(&log, "sibling"));

    h.game.tick();
    h.game.tick();

    assert_eq!(entries(&log), vec!["sibling", "sibling"]);
    assert_eq!(h.game.state(), LoopState::Running);
    assert_eq!(h.game.registry().len(EventKind::Draw), 2);

    let diags = h.diagnostics.borrow();
    assert_eq!(diags.len(), 2);
    assert_eq!(diags[0], "subscriber failed during draw dispatch: texture atlas missing");
}

#[test]
fn failing_subscriber_mutations_still_apply() {
    let mut h = running();
    let log: Log = Rc::default();
    let late = recorder(&log, "late");

    let to_add = late.clone();
    h.game.on(EventKind::Update, move |_, ctx| {
        ctx.add(EventKind::Draw, to_add.clone());
        anyhow::bail!("gave up after subscribing")
    });

    h.game.tick();
    assert_eq!(entries(&log), vec!["late"]);
}

// ── Host notifications ────────────────────────────────────────────────────

#[test]
fn host_notifications_dispatch_lifecycle_events() {
    let mut h = running();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for kind in [EventKind::Focus, EventKind::Blur, EventKind::Resize] {
        let sink = seen.clone();
        h.game.on(kind, move |event, _| {
            sink.borrow_mut().push(*event);
            Ok(())
        });
    }

    h.game.notify_focus(true);
    h.game.notify_focus(false);
    h.game.notify_resize(1024, 768);

    assert_eq!(
        *seen.borrow(),
        vec![Event::Focus, Event::Blur, Event::Resize { width: 1024, height: 768 }]
    );
}

#[test]
fn lifecycle_events_dispatch_while_not_running() {
    let mut h = harness();
    let log: Log = Rc::default();
    h.game.add(EventKind::Resize, recorder(&log, "resize"));

    h.game.notify_resize(10, 10);
    assert_eq!(entries(&log), vec!["resize"]);
    assert_eq!(h.game.state(), LoopState::Created);
}
