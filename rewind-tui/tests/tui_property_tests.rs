use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use proptest::prelude::*;
use ratatui::style::Color;
use rewind_core::{StepType, X402Status};
use rewind_player::ManualScheduler;
use rewind_tui::config::{AuthConfig, ReconnectConfig, SourceConfig, ThemeConfig, TuiConfig};
use rewind_tui::export::export_file_name;
use rewind_tui::keys::{map_key, map_prompt_key, Action};
use rewind_tui::persistence::{self, PersistedState};
use rewind_tui::poller::{jittered_backoff, next_backoff};
use rewind_tui::state::{faster, slower, App, SPEED_LADDER};
use rewind_tui::theme::SynthBruteTheme;
use rewind_test_utils::fixtures::{mixed_run, sequential_memory_run};

fn base_config() -> TuiConfig {
    TuiConfig {
        run_id: "run-42".to_string(),
        source: SourceConfig::Http {
            api_base_url: "http://localhost:8080".to_string(),
        },
        auth: AuthConfig {
            api_key: Some("test-key".to_string()),
            jwt: None,
        },
        request_timeout_ms: 5_000,
        refresh_interval_ms: 2_000,
        persistence_path: "tmp/rewind-tui.json".into(),
        error_log_path: "tmp/rewind-tui.log".into(),
        export_dir: "tmp/exports".into(),
        initial_speed: 1.0,
        theme: ThemeConfig {
            name: "synthbrute".to_string(),
        },
        reconnect: ReconnectConfig {
            initial_ms: 250,
            max_ms: 5_000,
            multiplier: 1.5,
            jitter_ms: 100,
        },
    }
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent {
        code,
        modifiers: KeyModifiers::NONE,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn config_http_source_requires_auth() {
    let mut config = base_config();
    config.auth = AuthConfig {
        api_key: None,
        jwt: None,
    };
    assert!(config.validate().is_err());

    config.source = SourceConfig::File {
        path: "run.json".into(),
    };
    assert!(config.validate().is_ok());
}

#[test]
fn config_requires_known_theme() {
    let mut config = base_config();
    config.theme = ThemeConfig {
        name: "unknown".to_string(),
    };
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_empty_run_id() {
    let mut config = base_config();
    config.run_id = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn config_rejects_inverted_backoff() {
    let mut config = base_config();
    config.reconnect.max_ms = 100;
    assert!(config.validate().is_err());
}

proptest! {
    #[test]
    fn config_initial_speed_bounds(speed in -10.0f64..10.0) {
        let mut config = base_config();
        config.initial_speed = speed;
        prop_assert_eq!(config.validate().is_ok(), (0.25..=4.0).contains(&speed));
    }
}

// ============================================================================
// Keys
// ============================================================================

#[test]
fn transport_keys_map_to_actions() {
    assert_eq!(map_key(press(KeyCode::Char(' '))), Some(Action::TogglePlay));
    assert_eq!(map_key(press(KeyCode::Right)), Some(Action::StepForward));
    assert_eq!(map_key(press(KeyCode::Char('h'))), Some(Action::StepBackward));
    assert_eq!(map_key(press(KeyCode::Char('G'))), Some(Action::JumpLast));
    assert_eq!(map_key(press(KeyCode::Char('e'))), Some(Action::NextError));
    assert_eq!(map_key(press(KeyCode::Tab)), Some(Action::ToggleDetail));
    assert_eq!(map_key(press(KeyCode::F(5))), None);
}

#[test]
fn ctrl_c_quits_but_prompt_ctrl_c_cancels() {
    let event = KeyEvent {
        code: KeyCode::Char('c'),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    };
    assert_eq!(map_key(event), Some(Action::Quit));
    assert_eq!(map_prompt_key(event), Some(Action::Cancel));
}

proptest! {
    #[test]
    fn key_release_never_maps(ch in proptest::char::range('!', '~')) {
        let event = KeyEvent {
            code: KeyCode::Char(ch),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::empty(),
        };
        prop_assert_eq!(map_key(event), None);
        prop_assert_eq!(map_prompt_key(event), None);
    }

    #[test]
    fn prompt_passes_printable_chars_through(ch in proptest::char::range('!', '~')) {
        prop_assert_eq!(map_prompt_key(press(KeyCode::Char(ch))), None);
    }
}

// ============================================================================
// Speed ladder and backoff
// ============================================================================

proptest! {
    #[test]
    fn speed_ladder_stays_in_range(current in 0.25f64..=4.0) {
        let up = faster(current);
        let down = slower(current);
        prop_assert!(SPEED_LADDER.contains(&up));
        prop_assert!(SPEED_LADDER.contains(&down));
        prop_assert!(up >= current || up == 4.0);
        prop_assert!(down <= current || down == 0.25);
    }

    #[test]
    fn backoff_is_capped(current in 1u64..10_000) {
        let config = base_config().reconnect;
        prop_assert!(next_backoff(current, &config) <= config.max_ms.max(current));
        let jittered = jittered_backoff(current, config.jitter_ms);
        prop_assert!(jittered >= current && jittered <= current + config.jitter_ms);
    }
}

// ============================================================================
// Theme
// ============================================================================

#[test]
fn theme_colors_distinguish_types() {
    let theme = SynthBruteTheme::synthbrute();
    let colors: Vec<Color> = StepType::all()
        .iter()
        .map(|t| theme.step_color(*t))
        .collect();
    for (i, a) in colors.iter().enumerate() {
        for b in &colors[i + 1..] {
            assert_ne!(a, b);
        }
    }
    assert_eq!(theme.x402_color(X402Status::Rejected), theme.error);
    assert_eq!(theme.risk_color(10.0), theme.success);
    assert_eq!(theme.risk_color(55.0), theme.warning);
    assert_eq!(theme.risk_color(85.0), theme.error);
}

// ============================================================================
// Persistence and export
// ============================================================================

#[test]
fn persisted_state_round_trips_for_matching_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    let state = PersistedState {
        run_id: "run-42".to_string(),
        current_step_index: 7,
        playback_speed: 2.0,
    };
    persistence::save(&path, &state).unwrap();

    assert_eq!(persistence::load_for_run(&path, "run-42").unwrap(), Some(state));
    assert_eq!(persistence::load_for_run(&path, "other").unwrap(), None);
    assert_eq!(
        persistence::load(&dir.path().join("missing.json")).unwrap(),
        None
    );
}

proptest! {
    #[test]
    fn export_file_name_is_path_safe(run_id in ".{0,24}") {
        let name = export_file_name(&run_id, chrono::Utc::now());
        prop_assert!(name.starts_with("replay-"));
        prop_assert!(name.ends_with(".json"));
        prop_assert!(!name.contains('/'));
        prop_assert!(!name.contains('\\'));
    }
}

// ============================================================================
// App
// ============================================================================

#[test]
fn app_replays_and_persists_position() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.export_dir = dir.path().to_path_buf();
    let mut app = App::new(config, "fixture".to_string(), ManualScheduler::new()).unwrap();
    app.apply_sources(mixed_run().into_sources());

    app.apply(Action::TogglePlay);
    app.session.scheduler_mut().run(3);
    let snapshot = app.session.snapshot();
    assert_eq!(snapshot.current_step_index, 3);
    assert!(snapshot.is_playing);

    app.apply(Action::StepForward);
    assert_eq!(app.persisted_state().current_step_index, 4);

    app.apply(Action::Reset);
    let snapshot = app.session.snapshot();
    assert_eq!(snapshot.current_step_index, 0);
    assert!(!snapshot.is_playing);
}

#[test]
fn app_clamps_cursor_when_run_shrinks() {
    let mut app = App::new(base_config(), "fixture".to_string(), ManualScheduler::new()).unwrap();
    app.apply_sources(sequential_memory_run(8).into_sources());
    app.apply(Action::JumpLast);
    assert_eq!(app.session.snapshot().current_step_index, 7);

    app.apply_sources(sequential_memory_run(3).into_sources());
    let snapshot = app.session.snapshot();
    assert_eq!(snapshot.current_step_index, 2);
    assert_eq!(snapshot.total_steps, 3);
}
