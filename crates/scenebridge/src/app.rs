//! Bridge event loop
//!
//! A single consumer owns the [`SceneMachine`] and handles receiver events one
//! at a time. Scene triggers are dispatched on background tasks and never
//! awaited here.

use anyhow::{Context, Result};
use scenebridge_control::{LedFxClient, ReceiverEvent, SacnReceiver};
use scenebridge_core::{BridgeConfig, ChannelPacket, SceneMachine, SceneTrigger, StatusSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::display::StatusView;

const EVENT_QUEUE_CAPACITY: usize = 256;

/// What the loop has to do after an event
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    /// Scene request to send
    pub trigger: Option<SceneTrigger>,
    /// Status changed and should be redrawn
    pub redraw: bool,
    /// Receiver is gone
    pub closed: bool,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Default::default()
        }
    }
}

/// Event handling without any I/O
pub struct Bridge {
    machine: SceneMachine,
    universe: u16,
    receiving: bool,
    notice: Option<String>,
}

impl Bridge {
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            machine: SceneMachine::from_config(config),
            universe: config.universe,
            receiving: false,
            notice: None,
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot::from_state(self.machine.state(), self.receiving)
            .with_notice(self.notice.clone())
    }

    pub fn machine(&self) -> &SceneMachine {
        &self.machine
    }

    pub fn handle_event(&mut self, event: ReceiverEvent) -> Outcome {
        match event {
            ReceiverEvent::Listening { addr, universes } => {
                info!("Started listening on {} for universes {:?}", addr, universes);
                self.notice = None;
                Outcome::redraw()
            }
            ReceiverEvent::Packet(packet) => {
                if packet.universe != self.universe {
                    return Outcome::default();
                }
                if !self.receiving {
                    self.receiving = true;
                    self.notice = None;
                }

                match self.machine.process_packet(&ChannelPacket::new(packet.slots())) {
                    Ok(trigger) => {
                        if let Some(trigger) = &trigger {
                            info!(
                                "Channel value {:03} on universe {}: {}",
                                self.machine.last_value(),
                                self.universe,
                                trigger
                            );
                        }
                        Outcome {
                            trigger,
                            redraw: true,
                            closed: false,
                        }
                    }
                    Err(e) => {
                        warn!("Packet from '{}' skipped: {}", packet.source_name, e);
                        self.notice = Some(format!("Packet skipped: {}", e));
                        Outcome::redraw()
                    }
                }
            }
            ReceiverEvent::PacketOutOfOrder(packet) => {
                warn!(
                    "Out-of-order packet from '{}' on universe {} (sequence {})",
                    packet.source_name, packet.universe, packet.sequence
                );
                self.notice = Some(format!(
                    "Out-of-order packet from '{}'",
                    packet.source_name
                ));
                Outcome::redraw()
            }
            ReceiverEvent::PacketError { from, error } => {
                warn!("Invalid sACN packet from {}: {}", from, error);
                self.notice = Some(format!("Invalid packet from {}: {}", from, error));
                Outcome::redraw()
            }
            ReceiverEvent::Terminated {
                universe,
                source,
                remaining,
            } => {
                info!(
                    "Source '{}' terminated universe {} ({} sources left)",
                    source, universe, remaining
                );
                if remaining == 0 {
                    self.receiving = false;
                }
                Outcome::redraw()
            }
            ReceiverEvent::Timeout(universe) => {
                warn!("No sACN data on universe {}", universe);
                self.receiving = false;
                self.notice = Some(format!("No sACN data on universe {}", universe));
                Outcome::redraw()
            }
            ReceiverEvent::Error(e) => {
                error!("sACN receiver error: {}", e);
                self.notice = Some(format!("Receiver error: {}", e));
                Outcome::redraw()
            }
            ReceiverEvent::Closed => {
                debug!("Receiver event stream ended");
                self.receiving = false;
                Outcome {
                    redraw: true,
                    closed: true,
                    ..Default::default()
                }
            }
        }
    }
}

/// Run the bridge on a bound receiver until `quit` fires or the receiver closes
pub async fn run(
    config: BridgeConfig,
    receiver: SacnReceiver,
    view: &mut dyn StatusView,
    mut quit: mpsc::UnboundedReceiver<()>,
) -> Result<()> {
    let client = LedFxClient::from_config(&config).context("Invalid LedFx address")?;
    let mut bridge = Bridge::new(&config);

    let scenes = bridge.machine().map();
    info!(
        "Universe {}, channel {}, {} scenes, LedFx at {}",
        config.universe,
        config.channel,
        scenes.len(),
        client.base_url()
    );
    if scenes.is_empty() {
        warn!("No scenes configured, channel values will not switch anything");
    }

    let (handle, mut events) = receiver.spawn(EVENT_QUEUE_CAPACITY);
    view.render(&bridge.snapshot())?;

    let result = loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else { break Ok(()) };
                let outcome = bridge.handle_event(event);

                if let Some(trigger) = outcome.trigger {
                    client.dispatch(trigger);
                }
                if outcome.redraw {
                    if let Err(e) = view.render(&bridge.snapshot()) {
                        break Err(e);
                    }
                }
                if outcome.closed {
                    break Ok(());
                }
            }
            Some(()) = quit.recv() => {
                debug!("Quit requested");
                break Ok(());
            }
        }
    };

    // The receiver task may be parked on a full queue
    drop(events);
    handle.close().await;
    info!("Bridge stopped");
    result
}
