// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use tracing::debug;

use crate::{
    client::tper::TrustedPeripheral,
    error::{Error, Result},
    models::{
        method::{
            MethodCall, PropertyMap, check_status, pack_args, properties_from_value,
            properties_to_value, unpack_args,
        },
        packet::{ComPacket, Packet, SubPacket},
        stream::{decode_stream, encode_stream},
        uid::Uid,
        value::{Command, Value},
    },
    spec::core::method,
};

const PROTOCOL: u8 = 0x01;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesResult {
    pub tper_properties: PropertyMap,
    pub host_properties: Option<PropertyMap>,
}

/// Optional parameters of StartSession, keyed 0..8 in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartSessionOptions {
    pub host_challenge: Option<Vec<u8>>,
    pub host_exchange_authority: Option<Uid>,
    pub host_exchange_cert: Option<Vec<u8>>,
    pub host_signing_authority: Option<Uid>,
    pub host_signing_cert: Option<Vec<u8>>,
    pub session_timeout: Option<u32>,
    pub trans_timeout: Option<u32>,
    pub initial_credit: Option<u32>,
    pub signed_hash: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionResult {
    pub host_session_number: u32,
    pub tper_session_number: u32,
    pub sp_challenge: Option<Vec<u8>>,
    pub sp_exchange_cert: Option<Vec<u8>>,
    pub sp_signing_cert: Option<Vec<u8>>,
    pub trans_timeout: Option<u32>,
    pub initial_credit: Option<u32>,
    pub signed_hash: Option<Vec<u8>>,
}

/// The session-manager layer: methods addressed to invoking id 0xFF,
/// exchanged outside any session (TSN and HSN zero on the wire).
pub struct SessionManager {
    tper: Arc<TrustedPeripheral>,
}

impl SessionManager {
    pub fn new(tper: Arc<TrustedPeripheral>) -> SessionManager {
        SessionManager { tper }
    }

    pub fn tper(&self) -> &Arc<TrustedPeripheral> {
        &self.tper
    }

    /// Exchanges communication properties with the TPer.
    pub async fn properties(
        &self,
        host_properties: Option<&PropertyMap>,
    ) -> Result<PropertiesResult> {
        let args = pack_args(
            Vec::new(),
            vec![host_properties.map(properties_to_value)],
        );
        let reply = self
            .invoke_method(MethodCall::new(Uid::SESSION_MANAGER, method::PROPERTIES, args))
            .await?;

        let method_name = self.method_name(method::PROPERTIES);
        let (required, mut optional) =
            unpack_args(&reply.args, 1, &[0]).map_err(|err| Error::InvalidResponse {
                method: method_name.clone(),
                message: err.to_string(),
            })?;
        let tper_properties =
            properties_from_value(&required[0]).map_err(|err| Error::InvalidResponse {
                method: method_name,
                message: err.to_string(),
            })?;
        let host_properties = optional[0]
            .take()
            .map(|value| properties_from_value(&value))
            .transpose()?;

        Ok(PropertiesResult {
            tper_properties,
            host_properties,
        })
    }

    /// Opens a session with a security provider. The TPer answers with the
    /// session number pair the conversation will be multiplexed by.
    pub async fn start_session(
        &self,
        host_session_id: u32,
        sp_id: Uid,
        write: bool,
        options: StartSessionOptions,
    ) -> Result<StartSessionResult> {
        let args = pack_args(
            vec![
                Value::from(host_session_id),
                Value::from(sp_id),
                Value::from(write),
            ],
            vec![
                options.host_challenge.map(Value::Bytes),
                options.host_exchange_authority.map(Value::from),
                options.host_exchange_cert.map(Value::Bytes),
                options.host_signing_authority.map(Value::from),
                options.host_signing_cert.map(Value::Bytes),
                options.session_timeout.map(Value::from),
                options.trans_timeout.map(Value::from),
                options.initial_credit.map(Value::from),
                options.signed_hash.map(Value::Bytes),
            ],
        );
        let reply = self
            .invoke_method(MethodCall::new(
                Uid::SESSION_MANAGER,
                method::START_SESSION,
                args,
            ))
            .await?;

        let method_name = self.method_name(method::START_SESSION);
        let parse = || -> Result<StartSessionResult> {
            let (required, mut optional) =
                unpack_args(&reply.args, 2, &[0, 1, 2, 3, 4, 5])?;
            Ok(StartSessionResult {
                host_session_number: required[0].get_uint()? as u32,
                tper_session_number: required[1].get_uint()? as u32,
                sp_challenge: take_bytes(&mut optional[0])?,
                sp_exchange_cert: take_bytes(&mut optional[1])?,
                sp_signing_cert: take_bytes(&mut optional[2])?,
                trans_timeout: take_uint(&mut optional[3])?,
                initial_credit: take_uint(&mut optional[4])?,
                signed_hash: take_bytes(&mut optional[5])?,
            })
        };
        parse().map_err(|err| match err {
            Error::SessionTerminated(_) => err,
            other => Error::InvalidResponse {
                method: method_name,
                message: other.to_string(),
            },
        })
    }

    /// Closes a session by sending a bare END_OF_SESSION token under its
    /// session numbers. The response is discarded.
    pub async fn end_session(
        &self,
        tper_session_number: u32,
        host_session_number: u32,
    ) -> Result<()> {
        debug!(tper_session_number, host_session_number, "closing session");
        let payload = encode_stream(&Value::Command(Command::EndOfSession), false)?;
        let packet = self.create_packet(payload, tper_session_number, host_session_number);
        let response = self.tper.send_packet(PROTOCOL, &packet).await?;

        if let Ok(bytes) = unwrap_packet(&response) {
            if let Ok(value) = decode_stream(bytes, false) {
                debug!(?value, "close session response");
            }
        }
        Ok(())
    }

    /// Wraps a serialized token stream into the three framing levels.
    pub(crate) fn create_packet(
        &self,
        payload: Vec<u8>,
        tper_session_number: u32,
        host_session_number: u32,
    ) -> ComPacket {
        let sub_packet = SubPacket::data(payload);
        let packet = Packet {
            tper_session_number,
            host_session_number,
            sequence_number: 0,
            ack_type: 0,
            acknowledgement: 0,
            payload: vec![sub_packet],
        };
        ComPacket {
            com_id: self.tper.com_id(),
            com_id_extension: self.tper.com_id_extension(),
            outstanding_data: 0,
            min_transfer: 0,
            payload: vec![packet],
        }
    }

    pub(crate) fn method_name(&self, method_id: Uid) -> String {
        self.tper.modules().name_or_uid(method_id, None)
    }

    /// Session-manager methods are answered by a mirrored method call
    /// (SyncSession for StartSession and so on), not by a result list.
    async fn invoke_method(&self, call: MethodCall) -> Result<MethodCall> {
        let method_name = self.method_name(call.method_id);
        let request = call.to_value();
        debug!(method = %method_name, request = %request, "session manager call");

        let payload = encode_stream(&request, true)?;
        let packet = self.create_packet(payload, 0, 0);
        let response = self.tper.send_packet(PROTOCOL, &packet).await?;
        let response_bytes = unwrap_packet(&response)?;
        let response_value = decode_stream(response_bytes, true)?;
        debug!(method = %method_name, response = %response_value, "session manager reply");

        let reply = MethodCall::from_value(&response_value).map_err(|err| {
            Error::InvalidResponse {
                method: method_name.clone(),
                message: err.to_string(),
            }
        })?;
        check_status(&method_name, reply.status)?;
        Ok(reply)
    }
}

/// First SubPacket payload of the first Packet; anything less is an empty
/// response.
pub(crate) fn unwrap_packet(packet: &ComPacket) -> Result<&[u8]> {
    let first_packet = packet.payload.first().ok_or(Error::NoResponse)?;
    let first_sub_packet = first_packet.payload.first().ok_or(Error::NoResponse)?;
    Ok(&first_sub_packet.payload)
}

fn take_bytes(slot: &mut Option<Value>) -> Result<Option<Vec<u8>>> {
    slot.take().map(Value::into_bytes).transpose()
}

fn take_uint(slot: &mut Option<Value>) -> Result<Option<u32>> {
    slot.take()
        .map(|value| value.get_uint().map(|number| number as u32))
        .transpose()
}
