//! Drive the device actions service with a scripted host.
//!
//! Usage: cargo run -p devactions-service --example simulate [config.json]
//!
//! Set RUST_LOG to adjust verbosity.

use anyhow::{Context, Result};
use devactions_host::{CallState, SensorKind};
use devactions_observers::{ActionsConfig, DOZE_PULSE_ACTION};
use devactions_service::{ActionsService, HostEvent, InMemoryHost};
use devactions_vote::Gesture;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,devactions=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ActionsConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => ActionsConfig::default(),
    };

    let host = InMemoryHost::new(0);
    let service = ActionsService::new(config, host.collaborators(), true)?;
    let mut pump = service.start_pump();

    tracing::info!("-- screen off, then a pickup");
    pump.send(HostEvent::ScreenOff)?;
    pump.stop();
    host.clock.advance_ms(2_000);
    host.sensors.emit_flag(SensorKind::FlatUp, true);
    host.sensors.emit_flag(SensorKind::FlatUp, false);

    tracing::info!("-- hand approaches the detector");
    host.clock.advance_ms(2_000);
    host.sensors.emit_gesture(Gesture::Approach.code());

    tracing::info!("-- incoming call silenced with a swipe");
    let mut pump = service.start_pump();
    pump.send(HostEvent::ScreenOn)?;
    pump.send(HostEvent::CallState {
        state: CallState::Ringing,
    })?;
    pump.stop();
    host.clock.advance_ms(800);
    host.sensors.emit_gesture(Gesture::Swipe.code());
    service.dispatch(&HostEvent::CallState {
        state: CallState::Idle,
    });

    tracing::info!("-- chop-chop");
    host.sensors.emit(SensorKind::ChopChop, &[1.0]);

    tracing::info!(
        doze_pulses = host.broadcaster.count_of(DOZE_PULSE_ACTION),
        silenced = host.telecom.silence_count(),
        torch_on = host.torch.is_on(),
        detector = ?host.hardware.current(),
        "simulation finished"
    );
    Ok(())
}
