// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use zerocopy::{
    BigEndian, FromBytes as ZFromBytes, Immutable, IntoBytes, KnownLayout, U16, U32,
};

use crate::error::{Error, Result};

pub const REQUEST_CODE_VERIFY_COMID_VALID: u32 = 0x0000_0001;
pub const REQUEST_CODE_STACK_RESET: u32 = 0x0000_0002;

pub const VERIFY_COMID_VALID_RESPONSE_LEN: usize = 46;
pub const STACK_RESET_RESPONSE_LEN: usize = 20;

/// State of a ComID as reported by VERIFY_COMID_VALID. Anything beyond
/// valid/invalid is vendor territory and kept opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComIdState {
    Invalid,
    Issued,
    Associated,
    Other(u32),
}

impl ComIdState {
    pub fn from_wire(value: u32) -> ComIdState {
        match value {
            0 => ComIdState::Invalid,
            1 => ComIdState::Issued,
            2 => ComIdState::Associated,
            other => ComIdState::Other(other),
        }
    }

    pub const fn to_wire(self) -> u32 {
        match self {
            ComIdState::Invalid => 0,
            ComIdState::Issued => 1,
            ComIdState::Associated => 2,
            ComIdState::Other(other) => other,
        }
    }

    pub const fn is_valid(self) -> bool {
        !matches!(self, ComIdState::Invalid)
    }
}

/// Request header shared by the protocol 0x02 management commands.
#[repr(C)]
#[derive(Debug, ZFromBytes, IntoBytes, KnownLayout, Immutable)]
struct RawComIdRequest {
    com_id: U16<BigEndian>,
    com_id_extension: U16<BigEndian>,
    request_code: U32<BigEndian>,
}

/// Response header shared by the protocol 0x02 management commands.
#[repr(C)]
#[derive(Debug, ZFromBytes, KnownLayout, Immutable)]
struct RawComIdResponse {
    com_id: U16<BigEndian>,
    com_id_extension: U16<BigEndian>,
    request_code: U32<BigEndian>,
    reserved: U16<BigEndian>,
    available_data_length: U16<BigEndian>,
}

fn encode_request(com_id: u16, com_id_extension: u16, request_code: u32) -> Vec<u8> {
    RawComIdRequest {
        com_id: U16::new(com_id),
        com_id_extension: U16::new(com_id_extension),
        request_code: U32::new(request_code),
    }
    .as_bytes()
    .to_vec()
}

pub fn encode_verify_comid_valid_request(com_id: u16, com_id_extension: u16) -> Vec<u8> {
    encode_request(com_id, com_id_extension, REQUEST_CODE_VERIFY_COMID_VALID)
}

pub fn encode_stack_reset_request(com_id: u16, com_id_extension: u16) -> Vec<u8> {
    encode_request(com_id, com_id_extension, REQUEST_CODE_STACK_RESET)
}

/// Common poll result of a management response: the request code echo and
/// how much payload is available so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComIdResponseHeader {
    pub com_id: u16,
    pub com_id_extension: u16,
    pub request_code: u32,
    pub available_data_length: u16,
}

fn parse_response_header(bytes: &[u8]) -> Result<(ComIdResponseHeader, &[u8])> {
    let (raw, rest) = RawComIdResponse::read_from_prefix(bytes)
        .map_err(|_| Error::invalid_format("truncated ComID management response"))?;
    Ok((
        ComIdResponseHeader {
            com_id: raw.com_id.get(),
            com_id_extension: raw.com_id_extension.get(),
            request_code: raw.request_code.get(),
            available_data_length: raw.available_data_length.get(),
        },
        rest,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyComIdValidResponse {
    pub header: ComIdResponseHeader,
    pub com_id_state: ComIdState,
}

pub fn parse_verify_comid_valid_response(bytes: &[u8]) -> Result<VerifyComIdValidResponse> {
    let (header, rest) = parse_response_header(bytes)?;
    if rest.len() < 4 {
        return Err(Error::invalid_format(
            "VERIFY_COMID_VALID response payload too short",
        ));
    }
    let state = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
    Ok(VerifyComIdValidResponse {
        header,
        com_id_state: ComIdState::from_wire(state),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackResetResponse {
    pub header: ComIdResponseHeader,
    pub success: bool,
}

pub fn parse_stack_reset_response(bytes: &[u8]) -> Result<StackResetResponse> {
    let (header, rest) = parse_response_header(bytes)?;
    if rest.len() < 4 {
        return Err(Error::invalid_format("STACK_RESET response payload too short"));
    }
    let status = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]);
    Ok(StackResetResponse {
        header,
        success: status == 0,
    })
}

fn encode_response_header(
    out: &mut [u8],
    com_id: u16,
    com_id_extension: u16,
    request_code: u32,
    available_data_length: u16,
) {
    out[0..2].copy_from_slice(&com_id.to_be_bytes());
    out[2..4].copy_from_slice(&com_id_extension.to_be_bytes());
    out[4..8].copy_from_slice(&request_code.to_be_bytes());
    out[10..12].copy_from_slice(&available_data_length.to_be_bytes());
}

/// Device-side encoder, used by the mock TPer.
pub fn encode_verify_comid_valid_response(
    com_id: u16,
    com_id_extension: u16,
    state: ComIdState,
) -> Vec<u8> {
    let mut out = vec![0u8; VERIFY_COMID_VALID_RESPONSE_LEN];
    let available = (VERIFY_COMID_VALID_RESPONSE_LEN - 12) as u16;
    encode_response_header(
        &mut out,
        com_id,
        com_id_extension,
        REQUEST_CODE_VERIFY_COMID_VALID,
        available,
    );
    out[12..16].copy_from_slice(&state.to_wire().to_be_bytes());
    out
}

/// Device-side encoder, used by the mock TPer.
pub fn encode_stack_reset_response(
    com_id: u16,
    com_id_extension: u16,
    success: bool,
) -> Vec<u8> {
    let mut out = vec![0u8; STACK_RESET_RESPONSE_LEN];
    encode_response_header(
        &mut out,
        com_id,
        com_id_extension,
        REQUEST_CODE_STACK_RESET,
        4,
    );
    let status: u32 = if success { 0 } else { 1 };
    out[12..16].copy_from_slice(&status.to_be_bytes());
    out
}

/// Request code of a protocol 0x02 management command, as the device parses
/// it.
pub fn parse_request_code(bytes: &[u8]) -> Result<u32> {
    if bytes.len() < 8 {
        return Err(Error::invalid_format("truncated ComID management request"));
    }
    Ok(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]))
}
