//! Service wiring tests against the in-memory host.

use devactions_host::{CallState, InMemoryPreferenceStore, SensorKind, WakeResource};
use devactions_observers::{
    ActionsConfig, AttentiveMode, ConfigError, PreferenceKey, DOZE_PULSE_ACTION,
};
use devactions_service::{ActionsService, HostEvent, InMemoryHost};
use devactions_vote::Gesture;
use std::io::Write;

const START_MS: i64 = 5_000_000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("devactions=debug")
        .with_test_writer()
        .try_init();
}

fn start(host: &InMemoryHost, config: ActionsConfig, interactive: bool) -> ActionsService {
    init_tracing();
    ActionsService::new(config, host.collaborators(), interactive).unwrap()
}

// =============================================================================
// Startup
// =============================================================================

mod startup {
    use super::*;

    #[test]
    fn test_observer_order() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);
        assert_eq!(
            service.coordinator().observer_names(),
            vec![
                "doze_pulse",
                "flashlight",
                "pickup",
                "stow_pickup",
                "ir_approach",
                "attentive_display"
            ]
        );
    }

    #[test]
    fn test_non_interactive_start_arms_screen_off_observers() {
        let host = InMemoryHost::new(START_MS);
        let _service = start(&host, ActionsConfig::default(), false);

        assert!(host.sensors.is_registered(SensorKind::FlatUp));
        assert!(host.sensors.is_registered(SensorKind::IrGesture));
        // Pickup and stow pickup both watch the stow sensor.
        assert_eq!(host.sensors.listener_count(SensorKind::Stow), 2);

        let config = host.hardware.current();
        assert!(config.active);
        assert!(config.mask.contains(Gesture::Approach));
    }

    #[test]
    fn test_interactive_start_leaves_detector_off() {
        let host = InMemoryHost::new(START_MS);
        let _service = start(&host, ActionsConfig::default(), true);

        assert!(!host.sensors.is_registered(SensorKind::FlatUp));
        assert!(!host.sensors.is_registered(SensorKind::IrGesture));
        // Chop-chop is watched regardless of the screen.
        assert!(host.sensors.is_registered(SensorKind::ChopChop));
        assert!(!host.hardware.current().active);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let host = InMemoryHost::new(START_MS);
        let mut config = ActionsConfig::default();
        config.timings.stow_window_ms = 0;

        let err = ActionsService::new(config, host.collaborators(), true).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert_eq!(host.sensors.total_registrations(), 0);
    }

    #[test]
    fn test_stored_preferences_override_config() {
        let store = InMemoryPreferenceStore::with_values([("gesture_ir", false)]);
        let host = InMemoryHost::with_preferences(START_MS, store);
        let service = start(&host, ActionsConfig::default(), false);

        let preferences = service.initial_preferences();
        assert!(!preferences.get(PreferenceKey::GestureIr));
        assert!(preferences.get(PreferenceKey::PickUp));

        assert!(!host.sensors.is_registered(SensorKind::IrGesture));
        assert!(!host.hardware.current().active);

        host.clock.advance_ms(2_000);
        assert_eq!(host.sensors.emit_gesture(Gesture::Approach.code()), 0);
        assert_eq!(host.broadcaster.count_of(DOZE_PULSE_ACTION), 0);
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"attentive_mode": "simple", "preferences": {{"gesture_attentive_display": true}}}}"#
        )
        .unwrap();

        let config = ActionsConfig::load(file.path()).unwrap();
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, config, true);

        assert_eq!(service.config().attentive_mode, AttentiveMode::Simple);
        assert!(service.attentive_display().is_enabled());
        assert!(service.attentive_display().is_armed());
    }
}

// =============================================================================
// Dispatch
// =============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn test_pickup_after_screen_off_waits_for_doze_interval() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);

        service.dispatch(&HostEvent::ScreenOff);
        host.sensors.emit_flag(SensorKind::FlatUp, true);
        host.sensors.emit_flag(SensorKind::FlatUp, false);
        assert_eq!(host.broadcaster.count_of(DOZE_PULSE_ACTION), 0);

        host.clock.advance_ms(1_501);
        host.sensors.emit_flag(SensorKind::FlatUp, true);
        host.sensors.emit_flag(SensorKind::FlatUp, false);
        assert_eq!(host.broadcaster.count_of(DOZE_PULSE_ACTION), 1);
    }

    #[test]
    fn test_repeated_screen_off_does_not_delay_pickup() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);

        service.dispatch(&HostEvent::ScreenOff);
        host.clock.advance_ms(2_000);
        service.dispatch(&HostEvent::ScreenOff);

        host.sensors.emit_flag(SensorKind::FlatUp, true);
        host.sensors.emit_flag(SensorKind::FlatUp, false);
        assert_eq!(host.broadcaster.count_of(DOZE_PULSE_ACTION), 1);
    }

    #[test]
    fn test_chop_chop_toggles_torch() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);

        host.sensors.emit(SensorKind::ChopChop, &[1.0]);
        assert!(host.torch.is_on());
        assert_eq!(host.vibrator.pulses().len(), 1);

        service.dispatch(&HostEvent::Preference {
            key: "gesture_flashlight".to_string(),
            enabled: false,
        });
        host.sensors.emit(SensorKind::ChopChop, &[1.0]);
        assert_eq!(host.torch.toggle_count(), 1);
    }

    #[test]
    fn test_attentive_lock_through_service() {
        let store = InMemoryPreferenceStore::with_values([("gesture_attentive_display", true)]);
        let host = InMemoryHost::with_preferences(START_MS, store);
        let service = start(&host, ActionsConfig::default(), true);

        host.sensors.emit_gesture(Gesture::ObjectDetected.code());
        assert!(host.power.is_held(WakeResource::ScreenBright));

        service.dispatch(&HostEvent::ScreenOff);
        assert!(!host.power.is_held(WakeResource::ScreenBright));
        assert!(!service.attentive_display().is_armed());
    }
}

// =============================================================================
// Event pump
// =============================================================================

mod pump {
    use super::*;

    #[test]
    fn test_ringing_call_through_pump() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);

        let mut pump = service.start_pump();
        pump.send(HostEvent::CallState {
            state: CallState::Ringing,
        })
        .unwrap();
        pump.stop();

        let config = host.hardware.current();
        assert!(config.active);
        assert!(config.mask.contains(Gesture::Swipe));

        host.clock.advance_ms(600);
        host.sensors.emit_gesture(Gesture::Swipe.code());
        assert_eq!(host.telecom.silence_count(), 1);
    }

    #[test]
    fn test_json_events_from_producer_thread() {
        let host = InMemoryHost::new(START_MS);
        let service = start(&host, ActionsConfig::default(), true);
        let mut pump = service.start_pump();

        let sender = pump.sender().unwrap();
        std::thread::spawn(move || {
            for line in [
                r#"{"type": "screen_off"}"#,
                r#"{"type": "preference", "key": "gesture_ir", "enabled": false}"#,
                r#"{"type": "preference", "key": "not_ours", "enabled": true}"#,
            ] {
                sender.send(HostEvent::from_json(line).unwrap()).unwrap();
            }
        })
        .join()
        .unwrap();
        pump.stop();

        assert_eq!(service.coordinator().device().screen_on(), Some(false));
        // Disabling IR approach tears down its registration and vote.
        assert!(!host.hardware.current().mask.contains(Gesture::Approach));
    }
}
