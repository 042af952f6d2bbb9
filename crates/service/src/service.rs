//! Builds and owns every device actions component.

use crate::collaborators::Collaborators;
use crate::event::HostEvent;
use crate::pump::EventPump;
use devactions_observers::{
    ActionsConfig, AlarmSilencer, AttentiveDisplay, CallSilencer, DeviceState, DozePulseAction,
    FlashlightAction, FlashlightSensor, IrApproachSensor, LifecycleCoordinator, PickupSensor,
    PreferenceKey, Preferences, Result, StowPickupSensor,
};
use devactions_vote::CapabilityVoteAggregator;
use std::sync::Arc;

/// The assembled device actions service.
pub struct ActionsService {
    config: ActionsConfig,
    preferences: Preferences,
    aggregator: Arc<CapabilityVoteAggregator>,
    coordinator: Arc<LifecycleCoordinator>,
    attentive: Arc<AttentiveDisplay>,
}

impl ActionsService {
    /// Build every observer against `host`, then apply the current screen
    /// state so the right observers start armed.
    ///
    /// Initial feature switches come from `config`, overridden by whatever
    /// the host preference store holds.
    pub fn new(config: ActionsConfig, host: Collaborators, interactive: bool) -> Result<Self> {
        config.validate()?;
        let preferences = config.preferences.overlay(host.preferences.as_ref());
        let timings = config.timings;
        tracing::info!(?preferences, mode = ?config.attentive_mode, "starting device actions");

        let aggregator = Arc::new(CapabilityVoteAggregator::new(host.hardware.clone()));
        let device = Arc::new(DeviceState::new());

        let doze = Arc::new(DozePulseAction::new(
            host.broadcaster.clone(),
            host.clock.clone(),
            device.clone(),
            timings.doze_pulse_interval(),
        ));
        let flashlight_action = Arc::new(FlashlightAction::new(
            host.torch.clone(),
            host.vibrator.clone(),
            timings.flashlight_vibrate(),
            preferences.get(PreferenceKey::Flashlight),
        ));

        let flashlight = FlashlightSensor::new(&host.sensors, flashlight_action);
        let pickup = PickupSensor::new(
            host.sensors.clone(),
            doze.clone(),
            preferences.get(PreferenceKey::PickUp),
        );
        let stow = StowPickupSensor::new(
            host.sensors.clone(),
            doze.clone(),
            preferences.get(PreferenceKey::PickUp),
        );
        let approach = IrApproachSensor::new(
            host.sensors.clone(),
            aggregator.handle(),
            doze.clone(),
            preferences.get(PreferenceKey::GestureIr),
        );
        let attentive = AttentiveDisplay::new(
            host.sensors.clone(),
            aggregator.handle(),
            host.power.clone(),
            host.clock.clone(),
            config.attentive_mode,
            &timings,
            preferences.get(PreferenceKey::AttentiveDisplay),
        );
        let call_silencer = CallSilencer::new(
            host.sensors.clone(),
            aggregator.handle(),
            host.telecom.clone(),
            host.clock.clone(),
            timings.silence_delay(),
            preferences.get(PreferenceKey::GestureIrSilence),
        );
        let alarm_silencer = AlarmSilencer::new(
            host.sensors.clone(),
            aggregator.handle(),
            host.broadcaster.clone(),
            host.clock.clone(),
            timings.silence_delay(),
            preferences.get(PreferenceKey::GestureIrSilence),
        );

        // The doze sink goes first so a screen-off restarts its throttle
        // before any observer can fire it.
        let coordinator = LifecycleCoordinator::new(device)
            .with_observer(doze)
            .with_observer(flashlight)
            .with_observer(pickup)
            .with_observer(stow)
            .with_observer(approach)
            .with_observer(attentive.clone())
            .with_call_silencer(call_silencer)
            .with_alarm_silencer(alarm_silencer);

        if interactive {
            coordinator.screen_turned_on();
        } else {
            coordinator.screen_turned_off();
        }

        Ok(Self {
            config,
            preferences,
            aggregator,
            coordinator: Arc::new(coordinator),
            attentive,
        })
    }

    pub fn config(&self) -> &ActionsConfig {
        &self.config
    }

    /// Feature switches in effect at startup.
    pub fn initial_preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn aggregator(&self) -> &Arc<CapabilityVoteAggregator> {
        &self.aggregator
    }

    pub fn coordinator(&self) -> &Arc<LifecycleCoordinator> {
        &self.coordinator
    }

    pub fn attentive_display(&self) -> &Arc<AttentiveDisplay> {
        &self.attentive
    }

    /// Apply one host event on the calling thread.
    pub fn dispatch(&self, event: &HostEvent) {
        event.apply(&self.coordinator);
    }

    /// Apply host events on a dedicated thread.
    pub fn start_pump(&self) -> EventPump {
        EventPump::start(self.coordinator.clone())
    }
}

impl std::fmt::Debug for ActionsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsService")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .field("published", &self.aggregator.published())
            .finish_non_exhaustive()
    }
}
