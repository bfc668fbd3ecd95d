// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use serde_json::json;
use sed_client_rs::{
    models::{
        uid::Uid,
        value::{Named, Value},
    },
    spec::{
        core::{self, type_uid},
        json::{json_to_value, value_to_json},
        types::{Type, format_type},
    },
};

#[test]
fn integers_render_as_numbers() -> Result<()> {
    let ty = core::find_type(type_uid::UINTEGER_4).expect("uinteger_4 missing");
    let json = value_to_json(&Value::from(1337u32), &ty, None)?;
    assert_eq!(json, json!(1337));
    assert_eq!(json_to_value(&json, &ty, None)?, Value::from(1337u32));

    let signed = Type::signed(2);
    let json = value_to_json(&Value::from(-5i16), &signed, None)?;
    assert_eq!(json, json!(-5));
    assert_eq!(json_to_value(&json, &signed, None)?, Value::from(-5i16));
    Ok(())
}

#[test]
fn enum_labels_round_trip() -> Result<()> {
    let ty = core::find_type(type_uid::BOOLEAN_ACE).expect("boolean_ACE missing");
    let json = value_to_json(&Value::from(1u16), &ty, None)?;
    assert_eq!(json, json!("Or"));
    assert_eq!(json_to_value(&json, &ty, None)?, Value::from(1u16));

    // Out-of-label values print as numbers.
    let ty = core::find_type(type_uid::LIFE_CYCLE_STATE).expect("life_cycle_state missing");
    assert_eq!(value_to_json(&Value::from(9u16), &ty, None)?, json!(9));
    assert!(json_to_value(&json!("Maybe"), &ty, None).is_err());
    Ok(())
}

#[test]
fn bytes_render_as_separated_hex() -> Result<()> {
    let ty = Type::fixed_bytes(4);
    let value = Value::bytes(vec![0xDE, 0xAD, 0xBE, 0xEF]);
    let json = value_to_json(&value, &ty, None)?;
    assert_eq!(json, json!("DE'AD'BE'EF"));
    assert_eq!(json_to_value(&json, &ty, None)?, value);

    assert!(json_to_value(&json!("DE'A"), &ty, None).is_err());
    Ok(())
}

#[test]
fn name_and_password_render_as_strings() -> Result<()> {
    let ty = core::find_type(type_uid::PASSWORD).expect("password missing");
    let value = Value::bytes(b"hunter2".to_vec());
    let json = value_to_json(&value, &ty, None)?;
    assert_eq!(json, json!("hunter2"));
    assert_eq!(json_to_value(&json, &ty, None)?, value);
    Ok(())
}

#[test]
fn references_use_resolver_when_available() -> Result<()> {
    let ty = core::find_type(type_uid::AUTHORITY_OBJECT_REF).expect("ref type missing");
    let value = Value::from(core::authority::SID);

    let plain = value_to_json(&value, &ty, None)?;
    assert_eq!(plain, json!("ref:0x0000000900000006"));
    assert_eq!(json_to_value(&plain, &ty, None)?, value);

    let name_of = |uid: Uid| core::find_name(uid);
    let pretty = value_to_json(&value, &ty, Some(&name_of))?;
    assert_eq!(pretty, json!("ref:Authority::SID"));

    let uid_of = |name: &str| core::find_uid(name);
    assert_eq!(json_to_value(&pretty, &ty, Some(&uid_of))?, value);

    assert!(json_to_value(&json!("Authority::SID"), &ty, Some(&uid_of)).is_err());
    Ok(())
}

#[test]
fn alternative_keys_carry_the_type_uid() -> Result<()> {
    let ty = core::find_type(type_uid::KEY_128).expect("key_128 missing");
    // Selected alternative: bytes_16, tagged with the low half of its UID.
    let value = Value::from(Named {
        name: Value::bytes(0x0000_0202u32.to_be_bytes().to_vec()),
        value: Value::bytes(vec![0x11; 16]),
    });
    let json = value_to_json(&value, &ty, None)?;
    let object = json.as_object().expect("alternative must render as an object");
    assert_eq!(object.len(), 1);
    assert!(object.contains_key("ref:0x0000000500000202"));

    assert_eq!(json_to_value(&json, &ty, None)?, value);
    Ok(())
}

#[test]
fn date_struct_uses_field_value_objects() -> Result<()> {
    let ty = core::find_type(type_uid::DATE).expect("date missing");
    let value = Value::List(vec![
        Value::named(0u16, 2024u16),
        Value::named(1u16, 5u16),
        Value::named(2u16, 17u16),
    ]);
    let json = value_to_json(&value, &ty, None)?;
    assert_eq!(
        json,
        json!([
            { "field": 0, "value": 2024 },
            { "field": 1, "value": 5 },
            { "field": 2, "value": 17 },
        ])
    );
    assert_eq!(json_to_value(&json, &ty, None)?, value);
    Ok(())
}

#[test]
fn struct_rejects_unknown_optional_keys() {
    let ty = core::find_type(type_uid::DATE).expect("date missing");
    let value = Value::List(vec![Value::named(9u16, 1u16)]);
    assert!(value_to_json(&value, &ty, None).is_err());
    assert!(json_to_value(&json!([{ "field": 9, "value": 1 }]), &ty, None).is_err());
}

#[test]
fn named_uinteger_name_must_match() {
    let ty = Type::name_value(2, Type::unsigned(2));
    let ok = Value::named(2u16, 31u16);
    let json = value_to_json(&ok, &ty, None).expect("matching name must render");
    assert_eq!(json, json!({ "name": 2, "value": 31 }));

    let mismatched = Value::named(3u16, 31u16);
    assert!(value_to_json(&mismatched, &ty, None).is_err());
    assert!(json_to_value(&json!({ "name": 3, "value": 31 }), &ty, None).is_err());
}

#[test]
fn list_of_references() -> Result<()> {
    let ty = core::find_type(type_uid::ACL).expect("ACL missing");
    let value = Value::List(vec![
        Value::from(Uid(0x0000_0008_0000_0001)),
        Value::from(Uid(0x0000_0008_0000_0002)),
    ]);
    let json = value_to_json(&value, &ty, None)?;
    assert_eq!(
        json,
        json!(["ref:0x0000000800000001", "ref:0x0000000800000002"])
    );
    assert_eq!(json_to_value(&json, &ty, None)?, value);
    Ok(())
}

#[test]
fn type_mismatches_are_rejected() {
    let ty = Type::unsigned(4);
    assert!(value_to_json(&Value::bytes(vec![1, 2]), &ty, None).is_err());
    assert!(json_to_value(&json!("nope"), &ty, None).is_err());
}

#[test]
fn formatter_strings_are_stable() {
    assert_eq!(format_type(&Type::unsigned(8)), "uinteger_8");
    assert_eq!(format_type(&Type::signed(2)), "integer_2");
    assert_eq!(format_type(&Type::fixed_bytes(12)), "bytes_12");
    assert_eq!(format_type(&Type::capped_bytes(32)), "max_bytes_32");
    assert_eq!(
        format_type(&Type::list(Type::unsigned(4))),
        "list{ uinteger_4 }"
    );
    assert_eq!(
        format_type(&Type::struct_of(vec![Type::unsigned(1), Type::fixed_bytes(8)])),
        "struct{ uinteger_1, bytes_8 }"
    );
    assert_eq!(
        format_type(&Type::name_value(1, Type::unsigned(2))),
        "named{ 1: uinteger_2 }"
    );

    let key_128 = core::find_type(type_uid::KEY_128).expect("key_128 missing");
    assert_eq!(
        format_type(&key_128),
        "typeOr{ 00000202:bytes_16 | 00000205:bytes_32 }"
    );

    let auth_ref =
        core::find_type(type_uid::AUTHORITY_OBJECT_REF).expect("ref type missing");
    assert_eq!(format_type(&auth_ref), "objref{ Authority }");

    let object_ref = core::find_type(type_uid::OBJECT_REF).expect("object_ref missing");
    assert_eq!(format_type(&object_ref), "objref");
}
