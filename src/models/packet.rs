// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use zerocopy::{
    BigEndian, FromBytes as ZFromBytes, Immutable, IntoBytes, KnownLayout, U16, U32,
};

use crate::error::{Error, Result};

/// Payload discriminator of a SubPacket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPacketKind {
    Data,
    CreditControl,
}

impl SubPacketKind {
    pub const fn to_wire(self) -> u16 {
        match self {
            SubPacketKind::Data => 0x0000,
            SubPacketKind::CreditControl => 0x8001,
        }
    }

    pub fn from_wire(value: u16) -> Result<SubPacketKind> {
        match value {
            0x0000 => Ok(SubPacketKind::Data),
            0x8001 => Ok(SubPacketKind::CreditControl),
            other => Err(Error::invalid_format(format!(
                "unrecognized sub-packet kind {other:#06x}"
            ))),
        }
    }
}

/// 12-byte SubPacket header.
#[repr(C)]
#[derive(Debug, ZFromBytes, IntoBytes, KnownLayout, Immutable)]
struct SubPacketHeader {
    reserved: [u8; 6],
    kind: U16<BigEndian>,
    length: U32<BigEndian>,
}

/// 24-byte Packet header.
#[repr(C)]
#[derive(Debug, ZFromBytes, IntoBytes, KnownLayout, Immutable)]
struct PacketHeader {
    tper_session_number: U32<BigEndian>,
    host_session_number: U32<BigEndian>,
    sequence_number: U32<BigEndian>,
    reserved: U16<BigEndian>,
    ack_type: U16<BigEndian>,
    acknowledgement: U32<BigEndian>,
    length: U32<BigEndian>,
}

/// 20-byte ComPacket header.
#[repr(C)]
#[derive(Debug, ZFromBytes, IntoBytes, KnownLayout, Immutable)]
struct ComPacketHeader {
    reserved: U32<BigEndian>,
    com_id: U16<BigEndian>,
    com_id_extension: U16<BigEndian>,
    outstanding_data: U32<BigEndian>,
    min_transfer: U32<BigEndian>,
    length: U32<BigEndian>,
}

/// Innermost framing level; carries the token stream.
///
/// The serialized payload is zero-padded to a 4-byte boundary while the
/// header's length field keeps the unpadded byte count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubPacket {
    pub kind: u16,
    pub payload: Vec<u8>,
}

impl SubPacket {
    pub const HEADER_LEN: usize = 12;

    pub fn data(payload: Vec<u8>) -> SubPacket {
        SubPacket {
            kind: SubPacketKind::Data.to_wire(),
            payload,
        }
    }

    pub fn payload_len(&self) -> u32 {
        self.payload.len() as u32
    }

    pub fn padded_payload_len(&self) -> u32 {
        (self.payload.len() as u32).div_ceil(4) * 4
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let header = SubPacketHeader {
            reserved: [0; 6],
            kind: U16::new(self.kind),
            length: U32::new(self.payload_len()),
        };
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(&self.payload);
        out.resize(out.len() + (self.padded_payload_len() - self.payload_len()) as usize, 0);
    }

    fn decode(stream: &[u8]) -> Result<(SubPacket, &[u8])> {
        let (header, rest) = SubPacketHeader::read_from_prefix(stream)
            .map_err(|_| Error::invalid_format("truncated sub-packet header"))?;
        let length = header.length.get() as usize;
        let padded = length.div_ceil(4) * 4;
        if rest.len() < padded {
            return Err(Error::invalid_format(format!(
                "sub-packet payload truncated: expected {padded} bytes, got {}",
                rest.len()
            )));
        }
        let sub_packet = SubPacket {
            kind: header.kind.get(),
            payload: rest[..length].to_vec(),
        };
        Ok((sub_packet, &rest[padded..]))
    }
}

/// Session-level framing; carries the (TSN, HSN) pair responses are
/// demultiplexed by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    pub tper_session_number: u32,
    pub host_session_number: u32,
    pub sequence_number: u32,
    pub ack_type: u16,
    pub acknowledgement: u32,
    pub payload: Vec<SubPacket>,
}

impl Packet {
    pub const HEADER_LEN: usize = 24;

    pub fn payload_len(&self) -> u32 {
        self.payload
            .iter()
            .map(|sub| SubPacket::HEADER_LEN as u32 + sub.padded_payload_len())
            .sum()
    }

    fn encode(&self, out: &mut Vec<u8>) {
        let header = PacketHeader {
            tper_session_number: U32::new(self.tper_session_number),
            host_session_number: U32::new(self.host_session_number),
            sequence_number: U32::new(self.sequence_number),
            reserved: U16::new(0),
            ack_type: U16::new(self.ack_type),
            acknowledgement: U32::new(self.acknowledgement),
            length: U32::new(self.payload_len()),
        };
        out.extend_from_slice(header.as_bytes());
        for sub_packet in &self.payload {
            sub_packet.encode(out);
        }
    }

    fn decode(stream: &[u8]) -> Result<(Packet, &[u8])> {
        let (header, mut rest) = PacketHeader::read_from_prefix(stream)
            .map_err(|_| Error::invalid_format("truncated packet header"))?;
        let length = header.length.get() as usize;
        if rest.len() < length {
            return Err(Error::invalid_format(format!(
                "packet payload truncated: expected {length} bytes, got {}",
                rest.len()
            )));
        }
        let after = &rest[length..];
        rest = &rest[..length];

        let mut payload = Vec::new();
        while !rest.is_empty() {
            let (sub_packet, remaining) = SubPacket::decode(rest)?;
            payload.push(sub_packet);
            rest = remaining;
        }

        let packet = Packet {
            tper_session_number: header.tper_session_number.get(),
            host_session_number: header.host_session_number.get(),
            sequence_number: header.sequence_number.get(),
            ack_type: header.ack_type.get(),
            acknowledgement: header.acknowledgement.get(),
            payload,
        };
        Ok((packet, after))
    }
}

/// Outermost framing level exchanged over IF-SEND/IF-RECV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComPacket {
    pub com_id: u16,
    pub com_id_extension: u16,
    pub outstanding_data: u32,
    pub min_transfer: u32,
    pub payload: Vec<Packet>,
}

impl ComPacket {
    pub const HEADER_LEN: usize = 20;

    pub fn payload_len(&self) -> u32 {
        self.payload
            .iter()
            .map(|packet| Packet::HEADER_LEN as u32 + packet.payload_len())
            .sum()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            Self::HEADER_LEN + self.payload_len() as usize,
        );
        let header = ComPacketHeader {
            reserved: U32::new(0),
            com_id: U16::new(self.com_id),
            com_id_extension: U16::new(self.com_id_extension),
            outstanding_data: U32::new(self.outstanding_data),
            min_transfer: U32::new(self.min_transfer),
            length: U32::new(self.payload_len()),
        };
        out.extend_from_slice(header.as_bytes());
        for packet in &self.payload {
            packet.encode(&mut out);
        }
        out
    }

    pub fn from_bytes(stream: &[u8]) -> Result<ComPacket> {
        let (header, rest) = ComPacketHeader::read_from_prefix(stream)
            .map_err(|_| Error::invalid_format("truncated com-packet header"))?;
        let length = header.length.get() as usize;
        if rest.len() < length {
            return Err(Error::invalid_format(format!(
                "com-packet payload truncated: expected {length} bytes, got {}",
                rest.len()
            )));
        }
        let mut rest = &rest[..length];

        let mut payload = Vec::new();
        while !rest.is_empty() {
            let (packet, remaining) = Packet::decode(rest)?;
            payload.push(packet);
            rest = remaining;
        }

        Ok(ComPacket {
            com_id: header.com_id.get(),
            com_id_extension: header.com_id_extension.get(),
            outstanding_data: header.outstanding_data.get(),
            min_transfer: header.min_transfer.get(),
            payload,
        })
    }
}
