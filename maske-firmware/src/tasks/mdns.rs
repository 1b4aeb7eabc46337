// mDNS Responder Task - Advertised Hostname via Multicast DNS
//
// Die Maske ist unter `<MDNS_HOSTNAME>.local` erreichbar (RFC 6762, nur
// A-Records). Nach einer Trennung des Steuer-Clients löst der Render-Task
// über das Announce-Signal eine unaufgeforderte Ankündigung aus, damit die
// App die Maske sofort wiederfindet.

use core::net::{Ipv4Addr, SocketAddr};
use core::sync::atomic::{AtomicU32, Ordering};

use defmt::{Debug2Format, error, info, warn};
use edge_mdns::{HostAnswersMdnsHandler, buf::VecBufAccess, domain::base::Ttl, host::Host, io};
use edge_nal::{MulticastV4, UdpBind, UdpSplit};
use edge_nal_embassy::{Udp, UdpBuffers};
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;

use crate::AnnounceSignal;
use crate::config::{
    MDNS_HOSTNAME, MDNS_MULTICAST_ADDR, MDNS_PACKET_BUFFER_SIZE, MDNS_PORT,
    MDNS_RECONNECT_DELAY_SECS, MDNS_TTL_SECS, MDNS_UDP_BUFFER_SIZE,
};

/// UDP Buffer für den einen mDNS-Socket, überleben jeden Reconnect
type MdnsUdpBuffers = UdpBuffers<1, MDNS_UDP_BUFFER_SIZE, MDNS_UDP_BUFFER_SIZE>;

/// Counter für mDNS Transaction IDs (keine kryptographische Anforderung)
static RNG_COUNTER: AtomicU32 = AtomicU32::new(0);

fn mdns_rng(buf: &mut [u8]) {
    let mut counter = RNG_COUNTER.fetch_add(1, Ordering::Relaxed);
    for chunk in buf.chunks_mut(4) {
        let bytes = counter.to_le_bytes();
        let len = chunk.len().min(4);
        chunk[..len].copy_from_slice(&bytes[..len]);
        counter = counter.wrapping_add(1);
    }
}

/// mDNS Responder Task
///
/// Wartet auf WiFi + DHCP, bindet 0.0.0.0:5353, tritt der Multicast-Gruppe
/// bei und beantwortet Queries. Bei jedem Fehler Neustart nach
/// `MDNS_RECONNECT_DELAY_SECS`.
#[embassy_executor::task]
pub async fn mdns_responder_task(
    stack: &'static Stack<'static>,
    announce_signal: &'static AnnounceSignal,
) {
    info!("mDNS: Task started, waiting for network...");

    // StaticCell nur einmal initialisieren, jeder Reconnect nutzt dieselben Buffer
    static UDP_BUFFERS: StaticCell<MdnsUdpBuffers> = StaticCell::new();
    let udp_buffers: &'static MdnsUdpBuffers = UDP_BUFFERS.init_with(UdpBuffers::new);

    loop {
        wait_for_network(stack).await;

        match run_mdns_responder(stack, udp_buffers, announce_signal).await {
            Ok(()) => warn!("mDNS: Responder stopped normally"),
            Err(e) => error!("mDNS: Error: {}", e),
        }
        info!("mDNS: Reconnecting in {}s...", MDNS_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MDNS_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Link up ist und DHCP eine Adresse geliefert hat
async fn wait_for_network(stack: &'static Stack<'static>) {
    while !(stack.is_link_up() && stack.config_v4().is_some()) {
        Timer::after(Duration::from_millis(500)).await;
    }
}

async fn run_mdns_responder(
    stack: &'static Stack<'static>,
    udp_buffers: &'static MdnsUdpBuffers,
    announce_signal: &'static AnnounceSignal,
) -> Result<(), MdnsError> {
    let our_ip = stack
        .config_v4()
        .ok_or(MdnsError::NoAddress)?
        .address
        .address();
    info!("mDNS: Using IP {}", Debug2Format(&our_ip));

    let udp_stack = Udp::new(*stack, udp_buffers);

    let mut socket = udp_stack
        .bind(SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), MDNS_PORT))
        .await
        .map_err(|_| MdnsError::SocketBindFailed)?;

    socket
        .join_v4(Ipv4Addr::from(MDNS_MULTICAST_ADDR), Ipv4Addr::UNSPECIFIED)
        .await
        .map_err(|_| MdnsError::MulticastJoinFailed)?;

    let (recv, send) = socket.split();

    let host = Host {
        hostname: MDNS_HOSTNAME,
        ipv4: our_ip.into(),
        // kein proto-ipv6 in smoltcp
        ipv6: [0u8; 16].into(),
        ttl: Ttl::from_secs(MDNS_TTL_SECS),
    };

    let recv_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();
    let send_buf = VecBufAccess::<NoopRawMutex, MDNS_PACKET_BUFFER_SIZE>::new();

    // Jedes Signal sendet eine unaufgeforderte Ankündigung
    let mdns = io::Mdns::new(
        Some(our_ip),
        None,
        recv,
        send,
        recv_buf,
        send_buf,
        mdns_rng,
        announce_signal,
    );

    info!("mDNS: Responder running, advertising '{}.local'", MDNS_HOSTNAME);

    mdns.run(HostAnswersMdnsHandler::new(&host))
        .await
        .map_err(|_| MdnsError::ResponderFailed)
}

/// mDNS Fehler-Typen, jeder führt zu einem Neustart im Haupt-Loop
#[derive(Debug)]
enum MdnsError {
    /// DHCP-Adresse zwischenzeitlich verloren
    NoAddress,
    SocketBindFailed,
    MulticastJoinFailed,
    /// Netzwerk weg oder UDP Socket-Fehler
    ResponderFailed,
}

impl defmt::Format for MdnsError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MdnsError::NoAddress => defmt::write!(fmt, "No IPv4 address"),
            MdnsError::SocketBindFailed => defmt::write!(fmt, "Socket bind failed"),
            MdnsError::MulticastJoinFailed => defmt::write!(fmt, "Multicast join failed"),
            MdnsError::ResponderFailed => defmt::write!(fmt, "Responder failed"),
        }
    }
}
