//! sACN receiver
//!
//! Listens on UDP port 5568, joins the multicast group of every configured
//! universe and reports what arrives as [`ReceiverEvent`]s over a bounded
//! channel. The receiver never looks at slot values; it only frames, filters
//! and sequences packets.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use super::packet::{DataPacket, PacketError};
use super::sequence::SequenceTracker;
use crate::{error::ControlError, Result};

/// Default E1.31 port
pub const SACN_PORT: u16 = 5568;

/// E1.31 network data loss timeout
pub const NETWORK_DATA_LOSS_TIMEOUT: Duration = Duration::from_millis(2500);

/// Highest universe number
pub const MAX_UNIVERSE: u16 = 63999;

const MAX_DATAGRAM_SIZE: usize = 1500;
const TIMEOUT_CHECK_INTERVAL: Duration = Duration::from_millis(250);
const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Multicast group of a universe: 239.255.{hi}.{lo}
pub fn multicast_group(universe: u16) -> Ipv4Addr {
    let [hi, lo] = universe.to_be_bytes();
    Ipv4Addr::new(239, 255, hi, lo)
}

/// Events emitted by the receiver
#[derive(Debug)]
pub enum ReceiverEvent {
    /// Socket bound and groups joined
    Listening {
        addr: SocketAddr,
        universes: Vec<u16>,
    },
    /// In-order DMX data for a watched universe
    Packet(DataPacket),
    /// Packet arrived behind the last accepted sequence number
    PacketOutOfOrder(DataPacket),
    /// Datagram could not be decoded
    PacketError {
        from: SocketAddr,
        error: PacketError,
    },
    /// A source ended its stream; `remaining` sources are still live on the universe
    Terminated {
        universe: u16,
        source: String,
        remaining: usize,
    },
    /// No data for a universe within the data loss timeout
    Timeout(u16),
    /// Socket error; the receiver keeps listening
    Error(ControlError),
    /// Receiver stopped
    Closed,
}

/// Receiver settings
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub universes: Vec<u16>,
    pub bind_addr: SocketAddr,
    /// Interface used for multicast membership
    pub interface: Ipv4Addr,
    pub join_multicast: bool,
    pub timeout: Duration,
}

impl ReceiverConfig {
    /// Listen on all interfaces for the given universes
    pub fn new(universes: Vec<u16>) -> Self {
        Self {
            universes,
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), SACN_PORT),
            interface: Ipv4Addr::UNSPECIFIED,
            join_multicast: true,
            timeout: NETWORK_DATA_LOSS_TIMEOUT,
        }
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_interface(mut self, interface: Ipv4Addr) -> Self {
        self.interface = interface;
        self
    }

    /// Receive unicast only
    pub fn without_multicast(mut self) -> Self {
        self.join_multicast = false;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.universes.is_empty() {
            return Err(ControlError::SacnError("No universes configured".to_string()));
        }
        if let Some(&u) = self
            .universes
            .iter()
            .find(|&&u| u == 0 || u > MAX_UNIVERSE)
        {
            return Err(ControlError::SacnError(format!(
                "Invalid sACN universe: {} (must be 1-{})",
                u, MAX_UNIVERSE
            )));
        }
        Ok(())
    }
}

/// Per-universe bookkeeping, independent of the socket
#[derive(Debug)]
pub struct StreamState {
    universes: Vec<u16>,
    sequences: SequenceTracker,
    /// Last DMX packet per universe and source CID
    last_seen: HashMap<u16, HashMap<Uuid, Instant>>,
    timeout: Duration,
}

impl StreamState {
    pub fn new(universes: Vec<u16>, timeout: Duration) -> Self {
        Self {
            universes,
            sequences: SequenceTracker::new(),
            last_seen: HashMap::new(),
            timeout,
        }
    }

    /// Turn one datagram into at most one event
    pub fn handle_datagram(
        &mut self,
        buf: &[u8],
        from: SocketAddr,
        now: Instant,
    ) -> Option<ReceiverEvent> {
        let packet = match DataPacket::decode(buf) {
            Ok(packet) => packet,
            Err(PacketError::Extended) => {
                trace!("Ignoring sync/discovery packet from {}", from);
                return None;
            }
            Err(error) => return Some(ReceiverEvent::PacketError { from, error }),
        };

        if !self.universes.contains(&packet.universe) {
            trace!("Ignoring packet for universe {}", packet.universe);
            return None;
        }

        if packet.is_preview() {
            debug!(
                "Ignoring preview data from '{}' on universe {}",
                packet.source_name, packet.universe
            );
            return None;
        }

        if packet.is_terminated() {
            self.sequences.forget(packet.cid, packet.universe);
            let remaining = self.forget_source(packet.universe, packet.cid);
            return Some(ReceiverEvent::Terminated {
                universe: packet.universe,
                source: packet.source_name,
                remaining,
            });
        }

        if !self
            .sequences
            .accept(packet.cid, packet.universe, packet.sequence)
        {
            return Some(ReceiverEvent::PacketOutOfOrder(packet));
        }

        if !packet.is_dmx() {
            trace!(
                "Ignoring start code {:#04x} on universe {}",
                packet.start_code,
                packet.universe
            );
            return None;
        }

        self.last_seen
            .entry(packet.universe)
            .or_default()
            .insert(packet.cid, now);
        Some(ReceiverEvent::Packet(packet))
    }

    /// Number of sources currently sending on `universe`
    pub fn active_sources(&self, universe: u16) -> usize {
        self.last_seen.get(&universe).map_or(0, HashMap::len)
    }

    fn forget_source(&mut self, universe: u16, cid: Uuid) -> usize {
        let Some(sources) = self.last_seen.get_mut(&universe) else {
            return 0;
        };
        sources.remove(&cid);
        let remaining = sources.len();
        if remaining == 0 {
            self.last_seen.remove(&universe);
        }
        remaining
    }

    /// Drop sources that went silent and report universes left without any.
    ///
    /// Each silence is reported once.
    pub fn check_timeouts(&mut self, now: Instant) -> Vec<ReceiverEvent> {
        let timeout = self.timeout;
        let sequences = &mut self.sequences;
        let mut events = Vec::new();

        for (&universe, sources) in self.last_seen.iter_mut() {
            sources.retain(|cid, seen| {
                let alive = now.saturating_duration_since(*seen) < timeout;
                if !alive {
                    debug!("Source {} went silent on universe {}", cid, universe);
                    sequences.forget(*cid, universe);
                }
                alive
            });
            if sources.is_empty() {
                events.push(ReceiverEvent::Timeout(universe));
            }
        }

        self.last_seen.retain(|_, sources| !sources.is_empty());
        events
    }
}

/// Handle to a spawned receiver task
pub struct ReceiverHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ReceiverHandle {
    /// Stop the receiver and wait for it to finish
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = self.task.await;
    }
}

/// Bound sACN listener
pub struct SacnReceiver {
    socket: UdpSocket,
    state: StreamState,
    universes: Vec<u16>,
}

impl SacnReceiver {
    /// Bind the socket and join the multicast groups
    pub async fn bind(config: ReceiverConfig) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(config.bind_addr).await?;

        if config.join_multicast {
            for &universe in &config.universes {
                let group = multicast_group(universe);
                socket.join_multicast_v4(group, config.interface)?;
                debug!("Joined multicast group {} for universe {}", group, universe);
            }
        }

        info!(
            "sACN receiver bound to {} for universes {:?}",
            socket.local_addr()?,
            config.universes
        );

        Ok(Self {
            socket,
            state: StreamState::new(config.universes.clone(), config.timeout),
            universes: config.universes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the receive loop on a new task
    pub fn spawn(self, capacity: usize) -> (ReceiverHandle, mpsc::Receiver<ReceiverEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(tx, shutdown_rx));
        (
            ReceiverHandle {
                shutdown: Some(shutdown_tx),
                task,
            },
            rx,
        )
    }

    /// Receive until `shutdown` fires or the event channel is dropped
    pub async fn run(
        mut self,
        events: mpsc::Sender<ReceiverEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let addr = match self.local_addr() {
            Ok(addr) => addr,
            Err(e) => {
                error!("sACN receiver has no local address: {}", e);
                let _ = events.send(ReceiverEvent::Error(e)).await;
                let _ = events.send(ReceiverEvent::Closed).await;
                return;
            }
        };

        let listening = ReceiverEvent::Listening {
            addr,
            universes: self.universes.clone(),
        };
        if events.send(listening).await.is_err() {
            return;
        }

        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let mut ticker = tokio::time::interval(TIMEOUT_CHECK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        'recv: loop {
            let (pending, backoff): (Vec<ReceiverEvent>, bool) = tokio::select! {
                _ = &mut shutdown => break 'recv,
                res = self.socket.recv_from(&mut buf) => match res {
                    Ok((len, from)) => (
                        self.state
                            .handle_datagram(&buf[..len], from, Instant::now())
                            .into_iter()
                            .collect(),
                        false,
                    ),
                    Err(e) => {
                        warn!("sACN receive error: {}", e);
                        (vec![ReceiverEvent::Error(e.into())], true)
                    }
                },
                _ = ticker.tick() => (self.state.check_timeouts(Instant::now()), false),
            };

            // A full queue must not keep the task from seeing shutdown
            for event in pending {
                tokio::select! {
                    _ = &mut shutdown => break 'recv,
                    sent = events.send(event) => {
                        if sent.is_err() {
                            return;
                        }
                    }
                }
            }

            if backoff {
                tokio::select! {
                    _ = &mut shutdown => break 'recv,
                    _ = tokio::time::sleep(RECV_ERROR_BACKOFF) => {}
                }
            }
        }

        info!("sACN receiver closed");
        if events.try_send(ReceiverEvent::Closed).is_err() {
            debug!("Event queue full or gone, Closed not delivered");
        }
    }
}
