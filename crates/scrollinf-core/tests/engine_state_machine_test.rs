/// End-to-end tests of the engine's loading state machine, driven through the
/// fake host with the default observer strategy.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use scrollinf_core::{
    Engine, EngineCallbacks, EngineConfig, EngineError, LoadError, LoadingState,
};
use scrollinf_testing::{init_test_logging, FakeHost, Recorder, ScriptedLoader};

struct Fixture {
    host: Rc<FakeHost>,
    loader: ScriptedLoader,
    recorder: Recorder,
    engine: Engine<FakeHost>,
}

fn fixture_with(config: EngineConfig<scrollinf_testing::FakeElement>) -> Fixture {
    init_test_logging();
    let host = Rc::new(FakeHost::new());
    let loader = ScriptedLoader::new();
    let recorder = Recorder::new();
    let engine = Engine::new(Rc::clone(&host), config, recorder.wire(loader.callbacks()))
        .expect("valid config");
    Fixture {
        host,
        loader,
        recorder,
        engine,
    }
}

fn fixture() -> Fixture {
    fixture_with(EngineConfig::new())
}

#[test]
fn test_successful_load_goes_idle_loading_loaded() {
    let f = fixture();
    f.engine.start().unwrap();
    assert_eq!(f.engine.state(), LoadingState::Idle);

    f.host.reveal_markers();
    assert_eq!(f.engine.state(), LoadingState::Loading);
    assert!(f.engine.is_loading());
    assert_eq!(f.loader.calls(), 1);

    // The load is still pending after an event loop turn.
    f.host.run_until_stalled();
    assert_eq!(f.engine.state(), LoadingState::Loading);

    f.loader.resolve_next();
    f.host.run_until_stalled();

    assert_eq!(f.engine.state(), LoadingState::Loaded);
    assert_eq!(
        f.recorder.states(),
        vec![LoadingState::Loading, LoadingState::Loaded]
    );
    assert!(f.recorder.errors().is_empty());
}

#[test]
fn test_failed_load_goes_to_error_and_reports_once() {
    let f = fixture();
    f.engine.start().unwrap();

    f.host.reveal_markers();
    f.loader.reject_next("server returned 500");
    f.host.run_until_stalled();

    assert_eq!(f.engine.state(), LoadingState::Error);
    assert_eq!(
        f.recorder.states(),
        vec![LoadingState::Loading, LoadingState::Error]
    );
    assert_eq!(f.recorder.errors(), vec![LoadError::new("server returned 500")]);
}

#[test]
fn test_signals_while_loading_do_not_start_another_load() {
    let f = fixture();
    f.engine.start().unwrap();

    for _ in 0..5 {
        f.host.reveal_markers();
    }
    f.host.run_until_stalled();
    assert_eq!(f.loader.calls(), 1);
    assert_eq!(f.loader.in_flight(), 1);

    f.loader.resolve_next();
    f.host.run_until_stalled();

    // Once loaded, the next signal starts a new load.
    f.host.reveal_markers();
    assert_eq!(f.loader.calls(), 2);
    assert_eq!(
        f.recorder.states(),
        vec![
            LoadingState::Loading,
            LoadingState::Loaded,
            LoadingState::Loading
        ]
    );
}

#[test]
fn test_error_state_accepts_new_signals() {
    let f = fixture();
    f.engine.start().unwrap();

    f.host.reveal_markers();
    f.loader.reject_next("timeout");
    f.host.run_until_stalled();
    assert_eq!(f.engine.state(), LoadingState::Error);

    f.host.reveal_markers();
    assert_eq!(f.engine.state(), LoadingState::Loading);
    assert_eq!(f.loader.calls(), 2);
}

#[test]
fn test_disable_ignores_signals_until_enabled() {
    let f = fixture();
    f.engine.start().unwrap();
    f.engine.disable();

    assert!(!f.engine.is_observing());
    assert_eq!(f.host.observer_count(), 0);
    for _ in 0..3 {
        f.host.reveal_markers();
    }
    f.host.run_until_stalled();
    assert_eq!(f.loader.calls(), 0);
    assert!(f.recorder.states().is_empty());

    f.engine.enable().unwrap();
    assert!(f.engine.is_observing());
    f.host.reveal_markers();
    assert_eq!(f.loader.calls(), 1);
}

#[test]
fn test_disable_keeps_loading_state() {
    let f = fixture();
    f.engine.start().unwrap();
    f.host.reveal_markers();
    f.loader.resolve_next();
    f.host.run_until_stalled();

    f.engine.disable();
    assert_eq!(f.engine.state(), LoadingState::Loaded);
    assert!(!f.engine.is_enabled());
}

#[test]
fn test_start_is_noop_when_disabled_or_already_observing() {
    let f = fixture_with(EngineConfig::new().with_enabled(false));
    f.engine.start().unwrap();
    assert!(!f.engine.is_observing());
    assert_eq!(f.host.marker_count(), 0);

    f.engine.enable().unwrap();
    f.engine.start().unwrap();
    assert_eq!(f.host.marker_count(), 1);
    assert_eq!(f.host.observer_count(), 1);
}

#[test]
fn test_reset_returns_to_initial_state_and_detaches() {
    let f = fixture_with(EngineConfig::new().with_initial_state(LoadingState::Loaded));
    assert_eq!(f.engine.state(), LoadingState::Loaded);
    f.engine.start().unwrap();

    f.host.reveal_markers();
    f.loader.reject_next("nope");
    f.host.run_until_stalled();
    assert_eq!(f.engine.state(), LoadingState::Error);

    f.engine.reset();
    assert_eq!(f.engine.state(), LoadingState::Loaded);
    assert!(!f.engine.is_observing());
    assert_eq!(f.host.marker_count(), 0);
    assert_eq!(f.host.observer_count(), 0);
    assert_eq!(
        f.recorder.states(),
        vec![
            LoadingState::Loading,
            LoadingState::Error,
            LoadingState::Loaded
        ]
    );

    // Reset from the initial state itself does not notify.
    f.engine.reset();
    assert_eq!(f.recorder.states().len(), 3);
}

#[test]
fn test_destroy_is_idempotent() {
    let f = fixture();
    f.engine.start().unwrap();

    f.engine.destroy();
    f.engine.destroy();

    let stats = f.host.stats();
    assert_eq!(stats.markers_inserted, 1);
    assert_eq!(stats.markers_removed, 1);
    assert_eq!(stats.observers_disconnected, 1);
    assert!(f.engine.is_destroyed());
    assert!(f.recorder.states().is_empty());
}

#[test]
fn test_destroyed_engine_resumes_only_after_reset() {
    let f = fixture();
    f.engine.start().unwrap();
    f.engine.destroy();

    f.engine.start().unwrap();
    f.engine.enable().unwrap();
    assert!(!f.engine.is_observing());

    f.engine.reset();
    assert!(!f.engine.is_destroyed());
    f.engine.start().unwrap();
    assert!(f.engine.is_observing());
}

#[test]
fn test_set_state_notifies_only_on_change() {
    let f = fixture();
    f.engine.set_state(LoadingState::Loaded);
    f.engine.set_state(LoadingState::Loaded);
    assert_eq!(f.recorder.states(), vec![LoadingState::Loaded]);
}

#[test]
fn test_manual_loading_state_blocks_signals() {
    let f = fixture();
    f.engine.start().unwrap();

    // The caller marks its own initial fetch.
    f.engine.set_state(LoadingState::Loading);
    f.host.reveal_markers();
    assert_eq!(f.loader.calls(), 0);

    f.engine.set_state(LoadingState::Loaded);
    f.host.reveal_markers();
    assert_eq!(f.loader.calls(), 1);
}

#[test]
fn test_state_override_during_load_does_not_start_second_load() {
    let f = fixture();
    f.engine.start().unwrap();
    f.host.reveal_markers();

    f.engine.set_state(LoadingState::Idle);
    f.host.reveal_markers();
    assert_eq!(f.loader.calls(), 1);

    f.loader.resolve_next();
    f.host.run_until_stalled();
    assert_eq!(f.engine.state(), LoadingState::Loaded);
}

#[test]
fn test_completion_after_destroy_still_updates_state() {
    let f = fixture();
    f.engine.start().unwrap();
    f.host.reveal_markers();

    f.engine.destroy();
    assert_eq!(f.host.marker_count(), 0);

    f.loader.resolve_next();
    f.host.run_until_stalled();
    assert_eq!(f.engine.state(), LoadingState::Loaded);
    assert_eq!(f.host.observer_count(), 0);
}

#[test]
fn test_completion_after_last_handle_dropped() {
    let f = fixture();
    f.engine.start().unwrap();
    f.host.reveal_markers();
    let Fixture {
        host,
        loader,
        recorder,
        engine,
    } = f;
    drop(engine);

    loader.resolve_next();
    host.run_until_stalled();
    assert_eq!(
        recorder.states(),
        vec![LoadingState::Loading, LoadingState::Loaded]
    );
    // The pending load kept the engine alive; once it finished, everything is released.
    assert_eq!(host.marker_count(), 0);
    assert_eq!(host.observer_count(), 0);
}

#[test]
fn test_stop_from_inside_state_callback() {
    init_test_logging();
    let host = Rc::new(FakeHost::new());
    let slot: Rc<RefCell<Option<Engine<FakeHost>>>> = Rc::new(RefCell::new(None));
    let loader = ScriptedLoader::new();
    let callbacks = {
        let slot = Rc::clone(&slot);
        loader.callbacks().on_state_change(move |state| {
            if state == LoadingState::Loading {
                if let Some(engine) = slot.borrow().as_ref() {
                    engine.stop();
                }
            }
        })
    };
    let engine = Engine::new(Rc::clone(&host), EngineConfig::new(), callbacks).unwrap();
    *slot.borrow_mut() = Some(engine.clone());

    engine.start().unwrap();
    host.deliver_entries(&[
        scrollinf_core::MarkerVisibility::visible(),
        scrollinf_core::MarkerVisibility::visible(),
    ]);

    assert!(!engine.is_observing());
    assert_eq!(host.marker_count(), 0);
    assert_eq!(loader.calls(), 1);

    loader.resolve_next();
    host.run_until_stalled();
    assert_eq!(engine.state(), LoadingState::Loaded);
    slot.borrow_mut().take();
}

#[test]
fn test_sync_callback_without_error_handler() {
    init_test_logging();
    let host = Rc::new(FakeHost::new());
    let attempts = Rc::new(Cell::new(0));
    let counter = Rc::clone(&attempts);
    let callbacks = EngineCallbacks::new_sync(move || {
        counter.set(counter.get() + 1);
        Err::<(), _>(LoadError::from_value(&"quota exceeded"))
    });
    let engine = Engine::new(Rc::clone(&host), EngineConfig::new(), callbacks).unwrap();
    engine.start().unwrap();

    host.reveal_markers();
    host.run_until_stalled();

    // The failure is absorbed: only the state records it.
    assert_eq!(engine.state(), LoadingState::Error);
    assert_eq!(attempts.get(), 1);
}

#[test]
fn test_async_callback_resolves_on_executor() {
    init_test_logging();
    let host = Rc::new(FakeHost::new());
    let deferred = scrollinf_testing::Deferred::new();
    let callbacks = {
        let deferred = deferred.clone();
        EngineCallbacks::new(move || {
            let pending = deferred.future();
            async move { pending.await }
        })
    };
    let recorder = Recorder::new();
    let engine = Engine::new(Rc::clone(&host), EngineConfig::new(), recorder.wire(callbacks)).unwrap();
    engine.start().unwrap();

    host.reveal_markers();
    host.run_until_stalled();
    assert!(engine.is_loading());

    deferred.resolve();
    host.run_until_stalled();
    assert_eq!(
        recorder.states(),
        vec![LoadingState::Loading, LoadingState::Loaded]
    );
}

#[test]
fn test_spawn_failure_is_reported_as_load_error() {
    let f = fixture();
    f.engine.start().unwrap();
    f.host.shut_down_executor();

    f.host.reveal_markers();

    assert_eq!(f.engine.state(), LoadingState::Error);
    let errors = f.recorder.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message().starts_with("could not schedule load callback"));
}

#[test]
fn test_start_failure_leaves_engine_detached() {
    let f = fixture();
    f.host.fail_observers(true);

    let result = f.engine.start();
    assert!(result.is_err());
    assert!(!f.engine.is_observing());
    // The marker inserted before the observer failed is removed again.
    assert_eq!(f.host.marker_count(), 0);

    f.host.fail_observers(false);
    f.engine.start().unwrap();
    assert!(f.engine.is_observing());
}

#[test]
fn test_invalid_config_is_rejected() {
    let host = Rc::new(FakeHost::new());
    let loader = ScriptedLoader::new();
    let result = Engine::new(
        Rc::clone(&host),
        EngineConfig::new().with_threshold(-10.0),
        loader.callbacks(),
    );
    assert!(result.is_err());
}

#[test]
fn test_set_config_rebuilds_attached_detector() {
    let f = fixture();
    f.engine.start().unwrap();
    assert_eq!(f.host.observer_margins(), vec!["200px".to_string()]);

    f.engine
        .set_config(EngineConfig::new().with_margin("0px 0px 400px 0px"))
        .unwrap();
    assert!(f.engine.is_observing());
    assert_eq!(f.host.observer_margins(), vec!["0px 0px 400px 0px".to_string()]);
    assert_eq!(f.host.marker_count(), 1);

    let err = f
        .engine
        .set_config(EngineConfig::new().with_margin("lots"))
        .unwrap_err();
    assert!(matches!(err, EngineError::Config(_)));
    assert!(f.engine.is_observing());
}

#[test]
fn test_set_config_adopts_enabled_flag() {
    let f = fixture();
    f.engine.start().unwrap();

    f.engine
        .set_config(EngineConfig::new().with_enabled(false))
        .unwrap();
    assert!(!f.engine.is_observing());
    assert!(!f.engine.config().enabled);
}
