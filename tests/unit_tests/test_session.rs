// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;
use sed_client_rs::{
    client::{
        session::Session,
        session_manager::{SessionManager, StartSessionOptions},
        tper::TrustedPeripheral,
    },
    error::Error,
    models::{
        method::{MethodCall, MethodStatus, PropertyMap},
        packet::ComPacket,
        stream::decode_stream,
        uid::Uid,
        value::Value,
    },
    spec::{core, opal},
};

use crate::unit_tests::common::{
    OPAL2_BASE_COM_ID, ScriptedDevice, SharedScriptedDevice, discovery_with_opal2,
    method_call_reply, method_result_reply, wrap_packet,
};

const TSN: u32 = 0x1388;

fn scripted_session_manager() -> Result<(Arc<ScriptedDevice>, Arc<SessionManager>)> {
    let device = ScriptedDevice::new();
    device.push_reply(discovery_with_opal2());
    let tper = TrustedPeripheral::new(Box::new(SharedScriptedDevice(device.clone())))?;
    assert_eq!(tper.com_id(), OPAL2_BASE_COM_ID);
    let session_manager = Arc::new(SessionManager::new(Arc::new(tper)));
    Ok((device, session_manager))
}

/// Decodes the n-th sent ComPacket back into the method call it carried.
fn sent_call(device: &ScriptedDevice, index: usize) -> (ComPacket, MethodCall) {
    let sends = device.sends();
    let sent = &sends[index];
    assert_eq!(sent.protocol, 0x01);
    assert_eq!(sent.protocol_specific, OPAL2_BASE_COM_ID.to_le_bytes());
    let com_packet = ComPacket::from_bytes(&sent.data).expect("sent packet must parse");
    let payload = &com_packet.payload[0].payload[0].payload;
    let value = decode_stream(payload, true).expect("sent payload must parse");
    let call = MethodCall::from_value(&value).expect("sent payload must be a call");
    (com_packet, call)
}

async fn start_scripted_session(
    device: &Arc<ScriptedDevice>,
    session_manager: &Arc<SessionManager>,
) -> Result<Session> {
    device.push_reply(method_call_reply(
        OPAL2_BASE_COM_ID,
        core::method::SYNC_SESSION,
        vec![Value::from(1u32), Value::from(TSN)],
        MethodStatus::Success,
    ));
    Ok(Session::start(
        session_manager.clone(),
        opal::sp::LOCKING,
        Some(b"hunter2"),
        Some(core::authority::SID),
    )
    .await?)
}

#[tokio::test]
async fn start_session_serializes_a_session_manager_call() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    device.push_reply(method_call_reply(
        OPAL2_BASE_COM_ID,
        core::method::SYNC_SESSION,
        vec![Value::from(1u32), Value::from(TSN)],
        MethodStatus::Success,
    ));

    let result = session_manager
        .start_session(1, opal::sp::LOCKING, true, StartSessionOptions::default())
        .await?;
    assert_eq!(result.host_session_number, 1);
    assert_eq!(result.tper_session_number, TSN);

    let (com_packet, call) = sent_call(&device, 0);
    // Session manager traffic runs outside any session.
    assert_eq!(com_packet.payload[0].tper_session_number, 0);
    assert_eq!(com_packet.payload[0].host_session_number, 0);
    assert_eq!(call.invoking_id, Uid::SESSION_MANAGER);
    assert_eq!(call.method_id, core::method::START_SESSION);
    assert_eq!(call.args[0].get_uint()?, 1);
    assert_eq!(call.args[1].get_uid()?, opal::sp::LOCKING);
    assert_eq!(call.args[2].get_uint()?, 1);
    Ok(())
}

#[tokio::test]
async fn start_session_passes_the_password_as_host_challenge() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;
    assert_eq!(session.tper_session_number(), TSN);

    let (_, call) = sent_call(&device, 0);
    // Optional args: HostChallenge is key 0, HostSigningAuthority key 3.
    let challenge = call.args[3].get_named()?;
    assert_eq!(challenge.name.get_uint()?, 0);
    assert_eq!(challenge.value.get_bytes()?, b"hunter2");
    let authority = call.args[4].get_named()?;
    assert_eq!(authority.name.get_uint()?, 3);
    assert_eq!(authority.value.get_uid()?, core::authority::SID);

    // Let the session close cleanly.
    device.push_reply(wrap_packet(OPAL2_BASE_COM_ID, TSN, session.host_session_number(), vec![0xFA]));
    session.end().await?;
    Ok(())
}

#[tokio::test]
async fn end_session_sends_a_bare_end_of_session_token() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;
    let host_session_number = session.host_session_number();

    device.push_reply(wrap_packet(OPAL2_BASE_COM_ID, TSN, host_session_number, vec![0xFA]));
    session.end().await?;

    let sends = device.sends();
    let expected = wrap_packet(OPAL2_BASE_COM_ID, TSN, host_session_number, vec![0xFA]);
    assert_eq!(sends[1].data, expected);
    Ok(())
}

#[tokio::test]
async fn get_positions_columns_by_their_labels() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    let sid_row = Value::from(core::authority::SID);
    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::List(vec![
            Value::named(0u32, sid_row.clone()),
            Value::named(1u32, Value::bytes(b"SID".to_vec())),
        ])],
        MethodStatus::Success,
    ));

    let values = session
        .base()
        .get_columns(core::authority::SID, 0, 3)
        .await?;
    assert_eq!(values.len(), 3);
    assert_eq!(
        values[0].get_bytes()?,
        [0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x06]
    );
    assert_eq!(values[1].get_bytes()?, b"SID");
    // The TPer returned only two columns; the third stays empty.
    assert_eq!(values[2], Value::Empty);

    // The request addressed the object with a (startColumn, endColumn) block.
    let (com_packet, call) = sent_call(&device, 1);
    assert_eq!(com_packet.payload[0].tper_session_number, TSN);
    assert_eq!(call.invoking_id, core::authority::SID);
    assert_eq!(call.method_id, core::method::GET);
    let cell_block = call.args[0].get_list()?;
    assert_eq!(cell_block[0], Value::named(3u32, 0u32));
    assert_eq!(cell_block[1], Value::named(4u32, 2u32));
    Ok(())
}

#[tokio::test]
async fn get_of_an_empty_range_is_local() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    let values = session
        .base()
        .get_columns(core::authority::SID, 3, 3)
        .await?;
    assert!(values.is_empty());
    // No method call went out.
    assert_eq!(device.sends().len(), 1);
    Ok(())
}

#[tokio::test]
async fn set_wraps_values_under_the_optional_key() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        Vec::new(),
        MethodStatus::Success,
    ));
    session
        .base()
        .set(opal::c_pin::SID, &[3], &[Value::bytes(b"hunter2".to_vec())])
        .await?;

    let (_, call) = sent_call(&device, 1);
    assert_eq!(call.invoking_id, opal::c_pin::SID);
    assert_eq!(call.method_id, core::method::SET);
    let expected = vec![Value::named(
        0u32,
        Value::List(vec![Value::named(3u32, Value::bytes(b"hunter2".to_vec()))]),
    )];
    assert_eq!(call.args, expected);
    Ok(())
}

#[tokio::test]
async fn next_with_zero_count_returns_an_empty_list() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::List(Vec::new())],
        MethodStatus::Success,
    ));
    let rows = session.base().next(core::table::C_PIN, None, 0).await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn next_pages_row_uids() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::List(vec![
            Value::from(opal::c_pin::SID),
            Value::from(opal::c_pin::MSID),
        ])],
        MethodStatus::Success,
    ));
    let rows = session.base().next(core::table::C_PIN, None, 2).await?;
    assert_eq!(rows, vec![opal::c_pin::SID, opal::c_pin::MSID]);
    Ok(())
}

#[tokio::test]
async fn authenticate_interprets_the_verdict() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::from(0u8)],
        MethodStatus::Success,
    ));
    let err = session
        .base()
        .authenticate(opal::auth::ADMIN1, Some(b"wrong"))
        .await
        .expect_err("a zero verdict must fail");
    assert!(matches!(err, Error::Password));

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::from(1u8)],
        MethodStatus::Success,
    ));
    session
        .base()
        .authenticate(opal::auth::ADMIN1, Some(b"right"))
        .await?;

    // Authenticate is invoked on "this SP".
    let (_, call) = sent_call(&device, 1);
    assert_eq!(call.invoking_id, Uid::THIS_SP);
    assert_eq!(call.method_id, core::method::AUTHENTICATE);
    Ok(())
}

#[tokio::test]
async fn challenge_response_authentication_is_not_implemented() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        vec![Value::bytes(vec![0x5A; 16])],
        MethodStatus::Success,
    ));
    let err = session
        .base()
        .authenticate(opal::auth::ADMIN1, None)
        .await
        .expect_err("a challenge reply is unsupported");
    assert!(matches!(err, Error::NotImplemented(_)));
    Ok(())
}

#[tokio::test]
async fn non_success_statuses_become_errors() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        Vec::new(),
        MethodStatus::NotAuthorized,
    ));
    let err = session
        .base()
        .set(opal::c_pin::SID, &[3], &[Value::bytes(b"x".to_vec())])
        .await
        .expect_err("NOT_AUTHORIZED must surface");
    assert!(matches!(err, Error::NotAuthorized));
    Ok(())
}

#[tokio::test]
async fn tper_initiated_close_terminates_the_session() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_call_reply(
        OPAL2_BASE_COM_ID,
        core::method::CLOSE_SESSION,
        Vec::new(),
        MethodStatus::Success,
    ));

    let err = session
        .base()
        .get(core::authority::SID, 0)
        .await
        .expect_err("a TPer-side close must surface");
    assert!(matches!(err, Error::SessionTerminated(MethodStatus::Success)));
    assert_eq!(err.to_string(), "session terminated by TPer: success");
    Ok(())
}

#[tokio::test]
async fn opal_template_targets_the_security_provider() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let session = start_scripted_session(&device, &session_manager).await?;

    device.push_reply(method_result_reply(
        OPAL2_BASE_COM_ID,
        TSN,
        session.host_session_number(),
        Vec::new(),
        MethodStatus::Success,
    ));
    session.opal().activate(opal::sp::LOCKING).await?;

    let (_, call) = sent_call(&device, 1);
    assert_eq!(call.invoking_id, opal::sp::LOCKING);
    assert_eq!(call.method_id, opal::method::ACTIVATE);
    assert!(call.args.is_empty());
    Ok(())
}

#[tokio::test]
async fn properties_exchange_maps_both_sides() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;

    let mut tper_properties = PropertyMap::new();
    tper_properties.insert("MaxComPacketSize".to_string(), 65536);
    let reply_args = vec![
        sed_client_rs::models::method::properties_to_value(&tper_properties),
    ];
    device.push_reply(method_call_reply(
        OPAL2_BASE_COM_ID,
        core::method::PROPERTIES,
        reply_args,
        MethodStatus::Success,
    ));

    let mut host_properties = PropertyMap::new();
    host_properties.insert("MaxPackets".to_string(), 1);
    let result = session_manager.properties(Some(&host_properties)).await?;
    assert_eq!(result.tper_properties, tper_properties);
    assert!(result.host_properties.is_none());

    let (_, call) = sent_call(&device, 0);
    assert_eq!(call.method_id, core::method::PROPERTIES);
    // The host property map rides under optional key 0.
    let named = call.args[0].get_named()?;
    assert_eq!(named.name.get_uint()?, 0);
    Ok(())
}

#[tokio::test]
#[serial_test::serial]
async fn host_session_numbers_are_minted_monotonically() -> Result<()> {
    let (device, session_manager) = scripted_session_manager()?;
    let first = start_scripted_session(&device, &session_manager).await?;
    let second = start_scripted_session(&device, &session_manager).await?;
    assert!(second.host_session_number() > first.host_session_number());

    device.push_reply(wrap_packet(OPAL2_BASE_COM_ID, TSN, first.host_session_number(), vec![0xFA]));
    first.end().await?;
    device.push_reply(wrap_packet(OPAL2_BASE_COM_ID, TSN, second.host_session_number(), vec![0xFA]));
    second.end().await?;
    Ok(())
}

#[tokio::test]
async fn transport_grows_its_buffer_for_large_transfers() -> Result<()> {
    let device = ScriptedDevice::new();
    device.push_reply(discovery_with_opal2());
    let tper = TrustedPeripheral::new(Box::new(SharedScriptedDevice(device.clone())))?;

    let pending = ComPacket {
        com_id: OPAL2_BASE_COM_ID,
        com_id_extension: 0,
        outstanding_data: 1,
        min_transfer: 4096,
        payload: Vec::new(),
    };
    device.push_reply(pending.to_bytes());
    let complete = ComPacket {
        com_id: OPAL2_BASE_COM_ID,
        com_id_extension: 0,
        outstanding_data: 0,
        min_transfer: 0,
        payload: Vec::new(),
    };
    device.push_reply(complete.to_bytes());

    let request = ComPacket {
        com_id: OPAL2_BASE_COM_ID,
        ..ComPacket::default()
    };
    let response = tper.send_packet(0x01, &request).await?;
    assert_eq!(response.outstanding_data, 0);

    // Discovery, first poll at the default size, second after growth.
    assert_eq!(device.receive_lens(), vec![2048, 2048, 1 << 20]);
    Ok(())
}
