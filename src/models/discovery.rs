// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use bitflags::bitflags;
use zerocopy::{BigEndian, FromBytes as ZFromBytes, Immutable, KnownLayout, U16, U32};

use crate::error::{Error, Result};

/// 48-byte header leading a Level-0 Discovery response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryHeader {
    pub length_of_data: u32,
    pub version_major: u16,
    pub version_minor: u16,
    pub vendor_unique: [u8; 32],
}

#[repr(C)]
#[derive(ZFromBytes, KnownLayout, Immutable)]
struct RawDiscoveryHeader {
    length_of_data: U32<BigEndian>,
    version_major: U16<BigEndian>,
    version_minor: U16<BigEndian>,
    reserved: [u8; 8],
    vendor_unique: [u8; 32],
}

#[repr(C)]
#[derive(ZFromBytes, KnownLayout, Immutable)]
struct RawFeatureDescHeader {
    feature_code: U16<BigEndian>,
    version: u8,
    length: u8,
}

bitflags! {
    /// Capability byte of the TPer feature descriptor (code 0x0001).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TperCaps: u8 {
        const SYNC = 1 << 0;
        const ASYNC = 1 << 1;
        const ACK_NAK = 1 << 2;
        const BUFFER_MGMT = 1 << 3;
        const STREAMING = 1 << 4;
        const COMID_MGMT = 1 << 6;
    }
}

bitflags! {
    /// State byte of the Locking feature descriptor (code 0x0002). Bit 6 is
    /// inverted on the wire: set means MBR shadowing is NOT supported.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LockingState: u8 {
        const LOCKING_SUPPORTED = 1 << 0;
        const LOCKING_ENABLED = 1 << 1;
        const LOCKED = 1 << 2;
        const MEDIA_ENCRYPTION = 1 << 3;
        const MBR_ENABLED = 1 << 4;
        const MBR_DONE = 1 << 5;
        const MBR_SHADOWING_NOT_SUPPORTED = 1 << 6;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TperFeatureDesc {
    pub com_id_mgmt_supported: bool,
    pub streaming_supported: bool,
    pub buffer_mgmt_supported: bool,
    pub ack_nak_supported: bool,
    pub async_supported: bool,
    pub sync_supported: bool,
}

impl TperFeatureDesc {
    pub const FEATURE_CODE: u16 = 0x0001;

    fn parse(payload: &[u8]) -> Result<TperFeatureDesc> {
        let bits = first_byte(payload, "TPer feature")?;
        let caps = TperCaps::from_bits_truncate(bits);
        Ok(TperFeatureDesc {
            com_id_mgmt_supported: caps.contains(TperCaps::COMID_MGMT),
            streaming_supported: caps.contains(TperCaps::STREAMING),
            buffer_mgmt_supported: caps.contains(TperCaps::BUFFER_MGMT),
            ack_nak_supported: caps.contains(TperCaps::ACK_NAK),
            async_supported: caps.contains(TperCaps::ASYNC),
            sync_supported: caps.contains(TperCaps::SYNC),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockingFeatureDesc {
    pub mbr_supported: bool,
    pub mbr_done: bool,
    pub mbr_enabled: bool,
    pub media_encryption: bool,
    pub locked: bool,
    pub locking_enabled: bool,
    pub locking_supported: bool,
}

impl LockingFeatureDesc {
    pub const FEATURE_CODE: u16 = 0x0002;

    fn parse(payload: &[u8]) -> Result<LockingFeatureDesc> {
        let bits = first_byte(payload, "Locking feature")?;
        let state = LockingState::from_bits_truncate(bits);
        Ok(LockingFeatureDesc {
            mbr_supported: !state.contains(LockingState::MBR_SHADOWING_NOT_SUPPORTED),
            mbr_done: state.contains(LockingState::MBR_DONE),
            mbr_enabled: state.contains(LockingState::MBR_ENABLED),
            media_encryption: state.contains(LockingState::MEDIA_ENCRYPTION),
            locked: state.contains(LockingState::LOCKED),
            locking_enabled: state.contains(LockingState::LOCKING_ENABLED),
            locking_supported: state.contains(LockingState::LOCKING_SUPPORTED),
        })
    }
}

/// Fields shared by every SSC feature descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SscBasics {
    pub base_com_id: u16,
    pub num_com_ids: u16,
}

/// Capability fields of the fully populated SSC descriptors. Which of them
/// are meaningful depends on the SSC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SscCaps {
    pub crossing_range_behavior: bool,
    pub num_admins_supported: u16,
    pub num_users_supported: u16,
    pub initial_c_pin_sid_indicator: bool,
    pub c_pin_sid_revert_behavior: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SscFeatureDesc {
    Enterprise(SscBasics, SscCaps),
    Opal1(SscBasics, SscCaps),
    Opal2(SscBasics, SscCaps),
    Opalite(SscBasics, SscCaps),
    Pyrite1(SscBasics, SscCaps),
    Pyrite2(SscBasics, SscCaps),
    Ruby(SscBasics, SscCaps),
    KeyPerIo(SscBasics),
}

impl SscFeatureDesc {
    pub const fn feature_code(&self) -> u16 {
        match self {
            SscFeatureDesc::Enterprise(..) => 0x0100,
            SscFeatureDesc::Opal1(..) => 0x0200,
            SscFeatureDesc::Opal2(..) => 0x0203,
            SscFeatureDesc::Opalite(..) => 0x0301,
            SscFeatureDesc::Pyrite1(..) => 0x0302,
            SscFeatureDesc::Pyrite2(..) => 0x0303,
            SscFeatureDesc::Ruby(..) => 0x0304,
            SscFeatureDesc::KeyPerIo(..) => 0x0305,
        }
    }

    pub const fn feature_name(&self) -> &'static str {
        match self {
            SscFeatureDesc::Enterprise(..) => "Enterprise",
            SscFeatureDesc::Opal1(..) => "Opal v1",
            SscFeatureDesc::Opal2(..) => "Opal v2",
            SscFeatureDesc::Opalite(..) => "Opalite",
            SscFeatureDesc::Pyrite1(..) => "Pyrite v1",
            SscFeatureDesc::Pyrite2(..) => "Pyrite v2",
            SscFeatureDesc::Ruby(..) => "Ruby",
            SscFeatureDesc::KeyPerIo(..) => "Key Per I/O",
        }
    }

    pub const fn basics(&self) -> SscBasics {
        match self {
            SscFeatureDesc::Enterprise(basics, _)
            | SscFeatureDesc::Opal1(basics, _)
            | SscFeatureDesc::Opal2(basics, _)
            | SscFeatureDesc::Opalite(basics, _)
            | SscFeatureDesc::Pyrite1(basics, _)
            | SscFeatureDesc::Pyrite2(basics, _)
            | SscFeatureDesc::Ruby(basics, _)
            | SscFeatureDesc::KeyPerIo(basics) => *basics,
        }
    }

    pub const fn base_com_id(&self) -> u16 {
        self.basics().base_com_id
    }

    fn parse(feature_code: u16, payload: &[u8]) -> Result<Option<SscFeatureDesc>> {
        let constructor: fn(SscBasics, SscCaps) -> SscFeatureDesc = match feature_code {
            0x0100 => SscFeatureDesc::Enterprise,
            0x0200 => SscFeatureDesc::Opal1,
            0x0203 => SscFeatureDesc::Opal2,
            0x0301 => SscFeatureDesc::Opalite,
            0x0302 => SscFeatureDesc::Pyrite1,
            0x0303 => SscFeatureDesc::Pyrite2,
            0x0304 => SscFeatureDesc::Ruby,
            0x0305 => {
                let basics = parse_ssc_basics(payload)?;
                return Ok(Some(SscFeatureDesc::KeyPerIo(basics)));
            },
            _ => return Ok(None),
        };

        let basics = parse_ssc_basics(payload)?;
        if payload.len() < 13 {
            return Err(Error::invalid_format(format!(
                "SSC feature {feature_code:#06x} payload too short: {} bytes",
                payload.len()
            )));
        }
        let caps = SscCaps {
            crossing_range_behavior: payload[4] & 0x01 != 0,
            num_admins_supported: u16::from_be_bytes([payload[5], payload[6]]),
            num_users_supported: u16::from_be_bytes([payload[7], payload[8]]),
            initial_c_pin_sid_indicator: payload[9] != 0,
            c_pin_sid_revert_behavior: payload[10] != 0,
        };
        Ok(Some(constructor(basics, caps)))
    }
}

fn parse_ssc_basics(payload: &[u8]) -> Result<SscBasics> {
    if payload.len() < 4 {
        return Err(Error::invalid_format(format!(
            "SSC feature payload too short: {} bytes",
            payload.len()
        )));
    }
    Ok(SscBasics {
        base_com_id: u16::from_be_bytes([payload[0], payload[1]]),
        num_com_ids: u16::from_be_bytes([payload[2], payload[3]]),
    })
}

fn first_byte(payload: &[u8], what: &str) -> Result<u8> {
    payload
        .first()
        .copied()
        .ok_or_else(|| Error::invalid_format(format!("{what} payload is empty")))
}

/// Everything Level-0 Discovery told us about the device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TperDesc {
    pub header: DiscoveryHeader,
    pub tper: Option<TperFeatureDesc>,
    pub locking: Option<LockingFeatureDesc>,
    pub ssc: Vec<SscFeatureDesc>,
}

/// Parses a full Level-0 Discovery response buffer.
pub fn parse_discovery(bytes: &[u8]) -> Result<TperDesc> {
    let (header, features) = RawDiscoveryHeader::read_from_prefix(bytes)
        .map_err(|_| Error::invalid_format("discovery response shorter than its header"))?;

    let mut desc = TperDesc {
        header: DiscoveryHeader {
            length_of_data: header.length_of_data.get(),
            version_major: header.version_major.get(),
            version_minor: header.version_minor.get(),
            vendor_unique: header.vendor_unique,
        },
        ..TperDesc::default()
    };

    // The length field counts from just past itself.
    let size = header.length_of_data.get().saturating_sub(4) as usize;
    let mut offset = 0usize;

    while offset < size {
        let (feature_header, _) =
            RawFeatureDescHeader::read_from_prefix(&features[offset..]).map_err(|_| {
                Error::invalid_format("truncated feature descriptor header")
            })?;
        let length = feature_header.length as usize;
        let payload_start = offset + 4;
        if features.len() < payload_start + length {
            return Err(Error::invalid_format("truncated feature descriptor payload"));
        }
        let payload = &features[payload_start..payload_start + length];
        let feature_code = feature_header.feature_code.get();

        if feature_code == TperFeatureDesc::FEATURE_CODE {
            desc.tper = Some(TperFeatureDesc::parse(payload)?);
        } else if feature_code == LockingFeatureDesc::FEATURE_CODE {
            desc.locking = Some(LockingFeatureDesc::parse(payload)?);
        } else if let Some(ssc) = SscFeatureDesc::parse(feature_code, payload)? {
            desc.ssc.push(ssc);
        }

        offset = payload_start + length;
    }

    Ok(desc)
}
