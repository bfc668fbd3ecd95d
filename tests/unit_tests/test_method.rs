// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use sed_client_rs::{
    error::Error,
    models::{
        method::{
            MethodCall, MethodResult, MethodStatus, PropertyMap, check_status, pack_args,
            properties_from_value, properties_to_value, unpack_args,
        },
        uid::Uid,
        value::{Command, Value},
    },
    spec::core::method,
};

#[test]
fn call_wire_shape() {
    let call = MethodCall::new(
        Uid::SESSION_MANAGER,
        method::START_SESSION,
        vec![Value::from(1u32)],
    );
    let value = call.to_value();
    let content = value.get_list().expect("call must be a list");
    assert_eq!(content.len(), 6);
    assert_eq!(content[0], Value::Command(Command::Call));
    assert_eq!(content[1], Value::bytes(Uid::SESSION_MANAGER.to_be_bytes().to_vec()));
    assert_eq!(content[2], Value::bytes(method::START_SESSION.to_be_bytes().to_vec()));
    assert_eq!(content[4], Value::Command(Command::EndOfData));
}

#[test]
fn call_round_trip() -> Result<()> {
    let call = MethodCall::new(
        Uid(0x0000_0009_0000_0006),
        method::GET,
        vec![Value::List(vec![Value::named(3u32, 0u32)])],
    );
    let parsed = MethodCall::from_value(&call.to_value())?;
    assert_eq!(parsed, call);
    Ok(())
}

#[test]
fn result_round_trip() -> Result<()> {
    let result = MethodResult {
        values: vec![Value::from(1u8), Value::bytes(b"data".to_vec())],
        status: MethodStatus::Success,
    };
    let parsed = MethodResult::from_value(&result.to_value())?;
    assert_eq!(parsed, result);
    Ok(())
}

#[test]
fn tper_initiated_close_session() {
    let mut close = MethodCall::new(Uid::SESSION_MANAGER, method::CLOSE_SESSION, Vec::new());
    close.status = MethodStatus::Success;
    let err = MethodResult::from_value(&close.to_value())
        .expect_err("a close-session call must not parse as a result");
    assert!(matches!(err, Error::SessionTerminated(MethodStatus::Success)));
    assert_eq!(err.to_string(), "session terminated by TPer: success");
}

#[test]
fn malformed_result_streams_fail() {
    // Not a list.
    assert!(MethodResult::from_value(&Value::from(0u8)).is_err());
    // Too short.
    assert!(MethodResult::from_value(&Value::List(vec![Value::List(Vec::new())])).is_err());
    // Status list of the wrong arity.
    let value = Value::List(vec![
        Value::List(Vec::new()),
        Value::Command(Command::EndOfData),
        Value::List(vec![Value::from(0u8)]),
    ]);
    assert!(MethodResult::from_value(&value).is_err());
}

#[test]
fn status_text_and_aliases() {
    assert_eq!(MethodStatus::from_wire(0x3F), MethodStatus::Fail);
    assert_eq!(MethodStatus::from_wire(0x13), MethodStatus::Unrecognized(0x13));
    assert_eq!(MethodStatus::Fail.text(), "unspecified failure");

    assert!(check_status("Get", MethodStatus::Success).is_ok());
    assert!(matches!(
        check_status("Get", MethodStatus::NotAuthorized),
        Err(Error::NotAuthorized)
    ));
    assert!(matches!(
        check_status("Get", MethodStatus::SpBusy),
        Err(Error::SecurityProviderBusy)
    ));
    assert!(matches!(
        check_status("Get", MethodStatus::SpFrozen),
        Err(Error::SecurityProviderFrozen)
    ));
    match check_status("Get", MethodStatus::InvalidParameter) {
        Err(Error::Invocation { method, status }) => {
            assert_eq!(method, "Get");
            assert_eq!(status, "invalid argument");
        },
        other => panic!("expected an invocation error, got {other:?}"),
    }
}

#[test]
fn optional_args_are_labeled_from_zero() {
    let args = pack_args(
        vec![Value::from(7u32)],
        vec![None, Some(Value::from(42u32)), None, Some(Value::bytes(b"x".to_vec()))],
    );
    assert_eq!(args.len(), 3);
    assert_eq!(args[0], Value::from(7u32));
    assert_eq!(args[1], Value::named(1u32, 42u32));
    assert_eq!(args[2], Value::named(3u32, Value::bytes(b"x".to_vec())));
}

#[test]
fn unpack_splits_required_and_optional() -> Result<()> {
    let values = vec![
        Value::from(7u32),
        Value::named(1u32, 42u32),
        Value::named(0u32, 13u32),
    ];
    let (required, optional) = unpack_args(&values, 1, &[0, 1, 2])?;
    assert_eq!(required, vec![Value::from(7u32)]);
    assert_eq!(optional[0], Some(Value::from(13u32)));
    assert_eq!(optional[1], Some(Value::from(42u32)));
    assert_eq!(optional[2], None);
    Ok(())
}

#[test]
fn unpack_rejects_bad_shapes() {
    // Named value in a required slot.
    let values = vec![Value::named(0u32, 1u32)];
    assert!(unpack_args(&values, 1, &[]).is_err());

    // Unlabeled value in an optional slot.
    let values = vec![Value::from(1u32), Value::from(2u32)];
    assert!(unpack_args(&values, 1, &[0]).is_err());

    // Unknown optional key.
    let values = vec![Value::named(9u32, 1u32)];
    assert!(unpack_args(&values, 0, &[0, 1]).is_err());

    // Missing required argument.
    assert!(unpack_args(&[], 1, &[]).is_err());
}

#[test]
fn property_map_round_trip() -> Result<()> {
    let mut properties = PropertyMap::new();
    properties.insert("MaxComPacketSize".to_string(), 65536);
    properties.insert("MaxPackets".to_string(), 1);
    let value = properties_to_value(&properties);
    assert_eq!(properties_from_value(&value)?, properties);
    Ok(())
}
