// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{
    collections::VecDeque,
    sync::Mutex,
};

use crate::{
    client::device::{DeviceInfo, StorageDevice},
    error::{Error, Result},
    models::{
        comid::{
            self, ComIdState, REQUEST_CODE_STACK_RESET, REQUEST_CODE_VERIFY_COMID_VALID,
        },
        method::{MethodCall, MethodStatus, pack_args, properties_to_value, unpack_args},
        packet::{ComPacket, Packet, SubPacket},
        stream::{decode_stream, encode_stream},
        uid::Uid,
        value::{Command, Value},
    },
    spec::core::method,
};

/// A software TPer good enough to exercise the whole stack without
/// hardware: it answers discovery, the ComID management commands, and the
/// session-manager methods. Methods invoked inside a session go
/// unanswered, which the host observes as an empty response.
pub struct MockDevice {
    session: Mutex<MockSession>,
}

impl MockDevice {
    pub const BASE_COM_ID: u16 = 0x1000;

    pub fn new() -> MockDevice {
        MockDevice {
            session: Mutex::new(MockSession::new(Self::BASE_COM_ID, 0)),
        }
    }

    fn session(&self) -> Result<std::sync::MutexGuard<'_, MockSession>> {
        self.session
            .lock()
            .map_err(|_| Error::Device("mock device state poisoned".to_string()))
    }

    fn discovery(out: &mut [u8]) -> Result<()> {
        let mut features = Vec::new();

        // TPer feature: sync + streaming, no dynamic ComID management.
        features.extend([0x00, 0x01, 0x10, 0x0C]);
        features.push(0b0001_0001);
        features.extend([0u8; 11]);

        // Locking feature: nothing configured yet.
        features.extend([0x00, 0x02, 0x10, 0x0C]);
        features.extend([0u8; 12]);

        // Opal v1 SSC feature carrying the base ComID.
        features.extend([0x02, 0x00, 0x10, 0x10]);
        features.extend(Self::BASE_COM_ID.to_be_bytes());
        features.extend(1u16.to_be_bytes());
        features.extend([0u8; 12]);

        let total = 48 + features.len();
        if out.len() < total {
            return Err(Error::Device("receive buffer too small".to_string()));
        }
        out[..total].fill(0);
        out[0..4].copy_from_slice(&((44 + features.len()) as u32).to_be_bytes());
        out[48..total].copy_from_slice(&features);
        Ok(())
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        MockDevice::new()
    }
}

impl StorageDevice for MockDevice {
    fn security_send(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        data: &[u8],
    ) -> Result<()> {
        let com_id = u16::from_le_bytes(protocol_specific);
        match (protocol, com_id) {
            (0x01, MockDevice::BASE_COM_ID) => self.session()?.input(data),
            (0x02, MockDevice::BASE_COM_ID) => self.session()?.mgmt_input(data),
            _ => Err(Error::Device(format!(
                "IF-SEND: invalid security protocol ({protocol}) / ComID ({com_id})"
            ))),
        }
    }

    fn security_receive(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        out: &mut [u8],
    ) -> Result<()> {
        let com_id = u16::from_le_bytes(protocol_specific);
        match (protocol, com_id) {
            (0x01, 0x0001) => MockDevice::discovery(out),
            (0x01, MockDevice::BASE_COM_ID) => self.session()?.output(out),
            (0x02, MockDevice::BASE_COM_ID) => self.session()?.mgmt_output(out),
            _ => Err(Error::Device(format!(
                "IF-RECV: invalid security protocol ({protocol}) / ComID ({com_id})"
            ))),
        }
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Mock Device".to_string(),
            serial: "MOCK0001".to_string(),
            interface: "mock".to_string(),
        }
    }
}

struct MockSession {
    com_id: u16,
    com_id_extension: u16,
    tsn: Option<u32>,
    hsn: Option<u32>,
    next_tsn: u32,
    responses: VecDeque<Vec<u8>>,
    mgmt_response: Option<Vec<u8>>,
}

impl MockSession {
    fn new(com_id: u16, com_id_extension: u16) -> MockSession {
        MockSession {
            com_id,
            com_id_extension,
            tsn: None,
            hsn: None,
            next_tsn: 0x1000,
            responses: VecDeque::new(),
            mgmt_response: None,
        }
    }

    fn input(&mut self, data: &[u8]) -> Result<()> {
        let com_packet = ComPacket::from_bytes(data)?;
        if com_packet.com_id != self.com_id || com_packet.com_id_extension != 0 {
            return Err(Error::Device(
                "packet contains invalid ComID or ComIDExtension".to_string(),
            ));
        }
        let Some(packet) = com_packet.payload.first() else {
            return Ok(());
        };
        let Some(sub_packet) = packet.payload.first() else {
            return Ok(());
        };

        let value = decode_stream(&sub_packet.payload, true)
            .map_err(|_| Error::Device("invalid token stream".to_string()))?;
        let items = value.get_list()?;
        if items
            .first()
            .is_some_and(|item| *item == Value::Command(Command::EndOfSession))
        {
            self.end_session();
            return Ok(());
        }

        let call = MethodCall::from_value(&value)
            .map_err(|_| Error::Device("invalid method call format".to_string()))?;
        if call.invoking_id == Uid::SESSION_MANAGER {
            self.session_manager_input(call);
        }
        // Methods inside a session are accepted and left unanswered.
        Ok(())
    }

    fn output(&mut self, out: &mut [u8]) -> Result<()> {
        let response = match self.responses.front() {
            None => {
                let empty = ComPacket {
                    com_id: self.com_id,
                    com_id_extension: self.com_id_extension,
                    ..ComPacket::default()
                };
                empty.to_bytes()
            },
            Some(response) if response.len() <= out.len() => {
                let response = response.clone();
                self.responses.pop_front();
                response
            },
            Some(response) => {
                // Tell the host how much room the response needs.
                let pending = ComPacket {
                    com_id: self.com_id,
                    com_id_extension: self.com_id_extension,
                    outstanding_data: response.len() as u32,
                    min_transfer: response.len() as u32,
                    payload: Vec::new(),
                };
                pending.to_bytes()
            },
        };
        if response.len() > out.len() {
            return Err(Error::Device("receive buffer too small".to_string()));
        }
        out[..response.len()].copy_from_slice(&response);
        out[response.len()..].fill(0);
        Ok(())
    }

    fn session_manager_input(&mut self, call: MethodCall) {
        if call.method_id == method::START_SESSION {
            self.start_session(&call);
        } else if call.method_id == method::PROPERTIES {
            self.properties();
        }
    }

    fn start_session(&mut self, call: &MethodCall) {
        if self.tsn.is_some() {
            self.enqueue_reply(method::SYNC_SESSION, Vec::new(), MethodStatus::SpBusy);
            return;
        }

        let unpacked = unpack_args(&call.args, 3, &[0, 1, 2, 3, 4, 5, 6, 7, 8])
            .and_then(|(required, _)| Ok(required[0].get_uint()? as u32));
        match unpacked {
            Ok(hsn) => {
                let tsn = self.next_tsn;
                self.next_tsn += 1;
                self.tsn = Some(tsn);
                self.hsn = Some(hsn);
                self.enqueue_reply(
                    method::SYNC_SESSION,
                    vec![Value::from(hsn), Value::from(tsn)],
                    MethodStatus::Success,
                );
            },
            Err(_) => {
                self.enqueue_reply(
                    method::SYNC_SESSION,
                    Vec::new(),
                    MethodStatus::InvalidParameter,
                );
            },
        }
    }

    fn properties(&mut self) {
        let mut properties = crate::models::method::PropertyMap::new();
        properties.insert("MaxComPacketSize".to_string(), 2048);
        properties.insert("MaxIndTokenSize".to_string(), 1024);
        properties.insert("MaxPackets".to_string(), 1);
        properties.insert("MaxSubpackets".to_string(), 1);
        properties.insert("MaxMethods".to_string(), 1);
        let args = pack_args(vec![properties_to_value(&properties)], Vec::new());
        self.enqueue_reply(method::PROPERTIES, args, MethodStatus::Success);
    }

    fn end_session(&mut self) {
        self.responses.clear();
        self.tsn = None;
        self.hsn = None;
        self.enqueue_value(&Value::Command(Command::EndOfSession));
    }

    fn enqueue_reply(&mut self, method_id: Uid, args: Vec<Value>, status: MethodStatus) {
        let mut reply = MethodCall::new(Uid::SESSION_MANAGER, method_id, args);
        reply.status = status;
        self.enqueue_value(&reply.to_value());
    }

    fn enqueue_value(&mut self, value: &Value) {
        let Ok(payload) = encode_stream(value, value.is_list()) else {
            return;
        };
        let com_packet = ComPacket {
            com_id: self.com_id,
            com_id_extension: self.com_id_extension,
            outstanding_data: 0,
            min_transfer: 0,
            payload: vec![Packet {
                tper_session_number: self.tsn.unwrap_or(0),
                host_session_number: self.hsn.unwrap_or(0),
                sequence_number: 0,
                ack_type: 0,
                acknowledgement: 0,
                payload: vec![SubPacket::data(payload)],
            }],
        };
        self.responses.push_back(com_packet.to_bytes());
    }

    fn mgmt_input(&mut self, data: &[u8]) -> Result<()> {
        match comid::parse_request_code(data)? {
            REQUEST_CODE_VERIFY_COMID_VALID => {
                self.mgmt_response = Some(comid::encode_verify_comid_valid_response(
                    self.com_id,
                    self.com_id_extension,
                    ComIdState::Associated,
                ));
                Ok(())
            },
            REQUEST_CODE_STACK_RESET => {
                self.responses.clear();
                self.tsn = None;
                self.hsn = None;
                self.mgmt_response = Some(comid::encode_stack_reset_response(
                    self.com_id,
                    self.com_id_extension,
                    true,
                ));
                Ok(())
            },
            other => Err(Error::Device(format!(
                "unsupported ComID management request {other:#010x}"
            ))),
        }
    }

    fn mgmt_output(&mut self, out: &mut [u8]) -> Result<()> {
        out.fill(0);
        // Without a pending response the request-code field stays zero,
        // which the host reads as "no response available".
        if let Some(response) = self.mgmt_response.take() {
            let len = response.len().min(out.len());
            out[..len].copy_from_slice(&response[..len]);
        }
        Ok(())
    }
}
