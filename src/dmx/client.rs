// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use std::io;
use std::net::{SocketAddr, UdpSocket};

use tracing::info;

/// Sends encoded ArtNet packets. Sends are fire-and-forget and must not block.
pub trait ArtNetClient: Send + Sync {
    fn send(&self, packet: &[u8], target: SocketAddr) -> io::Result<()>;
}

/// ArtNet over a non-blocking UDP socket.
pub struct UdpArtNetClient {
    socket: UdpSocket,
}

impl UdpArtNetClient {
    /// Binds a socket to the given local address (use port 0 for an ephemeral port).
    pub fn bind(local: SocketAddr) -> io::Result<UdpArtNetClient> {
        let socket = UdpSocket::bind(local)?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        info!(local = %socket.local_addr()?, "ArtNet socket bound.");
        Ok(UdpArtNetClient { socket })
    }
}

impl ArtNetClient for UdpArtNetClient {
    fn send(&self, packet: &[u8], target: SocketAddr) -> io::Result<()> {
        // A full socket buffer surfaces as WouldBlock; the packet is dropped.
        let sent = self.socket.send_to(packet, target)?;
        if sent != packet.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, packet.len()),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
/// Mock ArtNet client for testing
pub struct MockArtNetClient {
    pub sent_packets: parking_lot::Mutex<Vec<SentPacket>>,
    pub should_fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SentPacket {
    pub target: SocketAddr,
    pub packet: super::artnet::ArtDmx,
}

#[cfg(test)]
impl MockArtNetClient {
    pub fn new() -> Self {
        Self {
            sent_packets: parking_lot::Mutex::new(Vec::new()),
            should_fail: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.should_fail
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }

    /// Get the number of packets sent
    pub fn packet_count(&self) -> usize {
        self.sent_packets.lock().len()
    }

    /// Get the last sent packet
    pub fn last_packet(&self) -> Option<SentPacket> {
        self.sent_packets.lock().last().cloned()
    }

    /// Clear all sent packets
    pub fn clear(&self) {
        self.sent_packets.lock().clear();
    }

    /// Get packets for a specific universe
    pub fn packets_for_universe(&self, universe: u16) -> Vec<SentPacket> {
        self.sent_packets
            .lock()
            .iter()
            .filter(|sent| sent.packet.universe == universe)
            .cloned()
            .collect()
    }

    /// Get the universes of all sent packets, in send order
    pub fn universes(&self) -> Vec<u16> {
        self.sent_packets
            .lock()
            .iter()
            .map(|sent| sent.packet.universe)
            .collect()
    }

    /// Get the data of the last packet sent to a universe
    pub fn last_data(&self, universe: u16) -> Option<Vec<u8>> {
        self.packets_for_universe(universe)
            .last()
            .map(|sent| sent.packet.data.clone())
    }
}

#[cfg(test)]
impl ArtNetClient for MockArtNetClient {
    fn send(&self, packet: &[u8], target: SocketAddr) -> io::Result<()> {
        if self.should_fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock ArtNet client failure",
            ));
        }

        let packet = super::artnet::ArtDmx::decode(packet)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.sent_packets.lock().push(SentPacket { target, packet });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::*;
    use crate::dmx::artnet;

    fn target() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 5), artnet::ARTNET_PORT))
    }

    #[test]
    fn test_mock_client_records_packets() {
        let client = MockArtNetClient::new();

        client
            .send(&artnet::encode(1, 0, 1, &[10, 20]), target())
            .unwrap();
        client
            .send(&artnet::encode(2, 0, 2, &[30, 40]), target())
            .unwrap();
        client
            .send(&artnet::encode(3, 0, 1, &[50, 60]), target())
            .unwrap();

        assert_eq!(3, client.packet_count());
        assert_eq!(vec![1, 2, 1], client.universes());
        assert_eq!(2, client.packets_for_universe(1).len());
        assert_eq!(Some(vec![50, 60]), client.last_data(1));
        assert_eq!(target(), client.last_packet().unwrap().target);

        client.clear();
        assert_eq!(0, client.packet_count());
    }

    #[test]
    fn test_mock_client_failure() {
        let client = MockArtNetClient::new();
        client.set_failing(true);
        assert!(client
            .send(&artnet::encode(1, 0, 1, &[0, 0]), target())
            .is_err());
        assert_eq!(0, client.packet_count());
    }

    #[test]
    fn test_udp_client_sends_to_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let client = UdpArtNetClient::bind("127.0.0.1:0".parse().unwrap()).unwrap();

        let packet = artnet::encode(9, 0, 4, &[1, 2, 3, 4]);
        client.send(&packet, receiver.local_addr().unwrap()).unwrap();

        let mut buffer = [0u8; 600];
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(2)))
            .unwrap();
        let (len, _) = receiver.recv_from(&mut buffer).unwrap();
        let decoded = artnet::ArtDmx::decode(&buffer[..len]).unwrap();
        assert_eq!(9, decoded.sequence);
        assert_eq!(4, decoded.universe);
        assert_eq!(vec![1, 2, 3, 4], decoded.data);
    }
}
