// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use hex_literal::hex;
use sed_client_rs::models::packet::{ComPacket, Packet, SubPacket};

fn sample_com_packet(payload: Vec<u8>) -> ComPacket {
    ComPacket {
        com_id: 0x07FE,
        com_id_extension: 0,
        outstanding_data: 0,
        min_transfer: 0,
        payload: vec![Packet {
            tper_session_number: 0x1388,
            host_session_number: 1,
            sequence_number: 0,
            ack_type: 0,
            acknowledgement: 0,
            payload: vec![SubPacket::data(payload)],
        }],
    }
}

#[test]
fn sub_packet_padding_invariants() {
    for (len, padded) in [(0u32, 0u32), (1, 4), (3, 4), (4, 4), (5, 8)] {
        let sub_packet = SubPacket::data(vec![0xAA; len as usize]);
        assert_eq!(sub_packet.payload_len(), len);
        assert_eq!(sub_packet.padded_payload_len(), padded);
        assert_eq!(padded % 4, 0);
    }
}

#[test]
fn length_fields_cover_children() {
    let com_packet = sample_com_packet(vec![0x01; 5]);
    let packet = &com_packet.payload[0];
    assert_eq!(packet.payload_len(), 12 + 8);
    assert_eq!(com_packet.payload_len(), 24 + 12 + 8);

    let bytes = com_packet.to_bytes();
    assert_eq!(bytes.len(), 20 + com_packet.payload_len() as usize);
}

#[test]
fn known_wire_form() {
    let com_packet = sample_com_packet(vec![0xFA]);
    let bytes = com_packet.to_bytes();
    assert_eq!(
        bytes,
        hex!(
            // ComPacket: reserved, comId 0x07FE, ext 0, outstanding 0,
            // minTransfer 0, length 40
            "00000000 07FE 0000 00000000 00000000 00000028"
            // Packet: tsn 0x1388, hsn 1, seq 0, reserved, ack type 0,
            // ack 0, length 16
            "00001388 00000001 00000000 0000 0000 00000000 00000010"
            // SubPacket: reserved, kind DATA, length 1, payload + padding
            "000000000000 0000 00000001 FA000000"
        )
    );
}

#[test]
fn com_packet_round_trip() -> Result<()> {
    let com_packet = sample_com_packet(b"hello".to_vec());
    let decoded = ComPacket::from_bytes(&com_packet.to_bytes())?;
    assert_eq!(decoded, com_packet);
    Ok(())
}

#[test]
fn round_trip_keeps_unpadded_length() -> Result<()> {
    let com_packet = sample_com_packet(vec![0x42; 7]);
    let decoded = ComPacket::from_bytes(&com_packet.to_bytes())?;
    assert_eq!(decoded.payload[0].payload[0].payload.len(), 7);
    Ok(())
}

#[test]
fn decode_ignores_trailing_buffer() -> Result<()> {
    // Receive buffers are larger than the response; the length field bounds
    // the parse.
    let com_packet = sample_com_packet(b"abc".to_vec());
    let mut bytes = com_packet.to_bytes();
    bytes.resize(2048, 0);
    assert_eq!(ComPacket::from_bytes(&bytes)?, com_packet);
    Ok(())
}

#[test]
fn truncated_packets_fail() {
    let bytes = sample_com_packet(b"abc".to_vec()).to_bytes();
    assert!(ComPacket::from_bytes(&bytes[..19]).is_err());
    assert!(ComPacket::from_bytes(&bytes[..bytes.len() - 4]).is_err());
}

#[test]
fn empty_com_packet_has_no_payload() -> Result<()> {
    let com_packet = ComPacket {
        com_id: 0x07FE,
        com_id_extension: 0,
        outstanding_data: 0x10,
        min_transfer: 4096,
        payload: Vec::new(),
    };
    let decoded = ComPacket::from_bytes(&com_packet.to_bytes())?;
    assert_eq!(decoded.outstanding_data, 0x10);
    assert_eq!(decoded.min_transfer, 4096);
    assert!(decoded.payload.is_empty());
    Ok(())
}
