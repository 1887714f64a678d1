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

//! ArtDmx (OpDmx) packet encoding and decoding.

use super::universe::{MAX_UNIVERSE, UNIVERSE_SIZE};

/// The standard ArtNet UDP port.
pub const ARTNET_PORT: u16 = 6454;

const SIGNATURE: &[u8; 8] = b"Art-Net\0";
const OP_DMX: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;

/// Size of the ArtDmx header preceding the DMX data.
pub const HEADER_SIZE: usize = 18;

/// Errors produced while decoding an ArtDmx packet.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArtNetError {
    #[error("packet is too short ({0} bytes)")]
    TooShort(usize),
    #[error("packet does not start with the Art-Net signature")]
    BadSignature,
    #[error("unsupported opcode {0:#06x}")]
    UnsupportedOpcode(u16),
    #[error("invalid data length {0}")]
    BadLength(u16),
}

/// A decoded ArtDmx packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtDmx {
    /// 1-255, or 0 when sequencing is disabled.
    pub sequence: u8,
    pub physical: u8,
    /// The 15 bit port address (net, sub-net and universe).
    pub universe: u16,
    pub data: Vec<u8>,
}

impl ArtDmx {
    /// Encodes the packet. Data is padded to an even length and truncated to 512 bytes.
    pub fn encode(&self) -> Vec<u8> {
        encode(self.sequence, self.physical, self.universe, &self.data)
    }

    pub fn decode(packet: &[u8]) -> Result<ArtDmx, ArtNetError> {
        if packet.len() < HEADER_SIZE {
            return Err(ArtNetError::TooShort(packet.len()));
        }
        if &packet[0..8] != SIGNATURE {
            return Err(ArtNetError::BadSignature);
        }

        let opcode = u16::from_le_bytes([packet[8], packet[9]]);
        if opcode != OP_DMX {
            return Err(ArtNetError::UnsupportedOpcode(opcode));
        }

        let length = u16::from_be_bytes([packet[16], packet[17]]);
        let data_len = usize::from(length);
        if length < 2 || data_len > UNIVERSE_SIZE || length % 2 != 0 {
            return Err(ArtNetError::BadLength(length));
        }
        if packet.len() < HEADER_SIZE + data_len {
            return Err(ArtNetError::TooShort(packet.len()));
        }

        Ok(ArtDmx {
            sequence: packet[12],
            physical: packet[13],
            universe: u16::from_le_bytes([packet[14], packet[15]]),
            data: packet[HEADER_SIZE..HEADER_SIZE + data_len].to_vec(),
        })
    }
}

/// Encodes an ArtDmx packet without copying the data into an intermediate struct.
pub fn encode(sequence: u8, physical: u8, universe: u16, data: &[u8]) -> Vec<u8> {
    let data = &data[..data.len().min(UNIVERSE_SIZE)];
    let length = (data.len() + data.len() % 2).max(2);

    let mut packet = vec![0u8; HEADER_SIZE + length];
    packet[0..8].copy_from_slice(SIGNATURE);
    packet[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[12] = sequence;
    packet[13] = physical;
    // The port address goes out low byte (SubUni) first.
    packet[14..16].copy_from_slice(&(universe & MAX_UNIVERSE).to_le_bytes());
    packet[16..18].copy_from_slice(&(length as u16).to_be_bytes());
    packet[HEADER_SIZE..HEADER_SIZE + data.len()].copy_from_slice(data);
    packet
}
