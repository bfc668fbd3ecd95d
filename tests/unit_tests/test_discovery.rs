// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use sed_client_rs::models::discovery::{SscFeatureDesc, parse_discovery};

use crate::unit_tests::common::{OPAL2_BASE_COM_ID, discovery_with_opal2};

#[test]
fn parses_tper_locking_and_opal2() -> Result<()> {
    let desc = parse_discovery(&discovery_with_opal2())?;

    let tper = desc.tper.expect("TPer feature missing");
    assert!(tper.sync_supported);
    assert!(!tper.com_id_mgmt_supported);

    let locking = desc.locking.expect("Locking feature missing");
    assert!(locking.locking_supported);
    assert!(locking.locking_enabled);
    assert!(!locking.locked);
    // Bit 6 clear means shadowing IS supported.
    assert!(locking.mbr_supported);

    assert_eq!(desc.ssc.len(), 1);
    let ssc = &desc.ssc[0];
    assert_eq!(ssc.feature_name(), "Opal v2");
    assert_eq!(ssc.feature_code(), 0x0203);
    assert_eq!(ssc.base_com_id(), OPAL2_BASE_COM_ID);
    match ssc {
        SscFeatureDesc::Opal2(basics, caps) => {
            assert_eq!(basics.num_com_ids, 1);
            assert_eq!(caps.num_admins_supported, 2);
            assert_eq!(caps.num_users_supported, 4);
            assert!(!caps.initial_c_pin_sid_indicator);
        },
        other => panic!("expected Opal v2, got {other:?}"),
    }
    Ok(())
}

#[test]
fn header_shorter_than_48_bytes_fails() {
    assert!(parse_discovery(&[0u8; 32]).is_err());
}

#[test]
fn unknown_features_are_skipped() -> Result<()> {
    let mut buf = vec![0u8; 128];
    // One vendor-specific descriptor (code 0xC001), then nothing.
    let features = [0xC0u8, 0x01, 0x10, 0x04, 0xDE, 0xAD, 0xBE, 0xEF];
    buf[0..4].copy_from_slice(&(44u32 + features.len() as u32).to_be_bytes());
    buf[48..48 + features.len()].copy_from_slice(&features);

    let desc = parse_discovery(&buf)?;
    assert!(desc.tper.is_none());
    assert!(desc.locking.is_none());
    assert!(desc.ssc.is_empty());
    Ok(())
}

#[test]
fn key_per_io_parses_base_com_id_only() -> Result<()> {
    let mut buf = vec![0u8; 128];
    let mut features = vec![0x03u8, 0x05, 0x10, 0x10];
    features.extend(0x0800u16.to_be_bytes());
    features.extend(2u16.to_be_bytes());
    features.extend([0u8; 12]);
    buf[0..4].copy_from_slice(&(44u32 + features.len() as u32).to_be_bytes());
    buf[48..48 + features.len()].copy_from_slice(&features);

    let desc = parse_discovery(&buf)?;
    assert_eq!(desc.ssc.len(), 1);
    assert_eq!(desc.ssc[0].feature_name(), "Key Per I/O");
    assert_eq!(desc.ssc[0].base_com_id(), 0x0800);
    Ok(())
}
