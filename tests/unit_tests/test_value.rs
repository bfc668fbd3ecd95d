// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use sed_client_rs::models::{
    stream::{decode_stream, emit_tokens, encode_stream, parse_tokens},
    token::{Tag, Token, decode_tokens},
    value::{Command, Int, Value},
};

fn round_trip(value: &Value) -> Result<Value> {
    let bytes = encode_stream(value, false)?;
    Ok(decode_stream(&bytes, false)?)
}

#[test]
fn integer_width_and_sign_survive() -> Result<()> {
    for value in [
        Value::Int(Int::U8(7)),
        Value::Int(Int::U16(7)),
        Value::Int(Int::U32(7)),
        Value::Int(Int::U64(7)),
        Value::Int(Int::I8(-7)),
        Value::Int(Int::I16(-7)),
        Value::Int(Int::I32(-7)),
        Value::Int(Int::I64(-7)),
    ] {
        assert_eq!(round_trip(&value)?, value);
    }
    Ok(())
}

#[test]
fn bytes_pick_the_smallest_atom() -> Result<()> {
    for (len, tag) in [(15usize, Tag::Short), (16, Tag::Medium), (2048, Tag::Long)] {
        let value = Value::bytes(vec![0x5A; len]);
        let bytes = encode_stream(&value, false)?;
        assert_eq!(Token::peek_tag(&bytes)?, tag);
        assert_eq!(round_trip(&value)?, value);
    }
    Ok(())
}

#[test]
fn nested_structure_round_trip() -> Result<()> {
    let value = Value::List(vec![
        Value::from(0x1234u16),
        Value::named(3u32, Value::bytes(b"hunter2".to_vec())),
        Value::List(vec![
            Value::Command(Command::StartTransaction),
            Value::bytes(vec![0u8; 20]),
        ]),
    ]);
    assert_eq!(round_trip(&value)?, value);
    Ok(())
}

#[test]
fn named_name_then_value() -> Result<()> {
    let value = Value::named(Value::bytes(b"MaxPackets".to_vec()), 32u32);
    assert_eq!(round_trip(&value)?, value);
    Ok(())
}

#[test]
fn empty_tokens_are_skipped() -> Result<()> {
    let mut tokens = Vec::new();
    emit_tokens(&Value::from(5u8), &mut tokens)?;
    tokens.push(Token::control(Tag::Empty));
    let values = parse_tokens(&tokens)?;
    assert_eq!(values, vec![Value::from(5u8)]);
    Ok(())
}

#[test]
fn named_rejects_a_third_item() {
    let tokens = vec![
        Token::control(Tag::StartName),
        Token {
            tag: Tag::Short,
            is_bytes: false,
            is_signed: false,
            data: vec![1],
        },
        Token {
            tag: Tag::Short,
            is_bytes: false,
            is_signed: false,
            data: vec![2],
        },
        Token {
            tag: Tag::Short,
            is_bytes: false,
            is_signed: false,
            data: vec![3],
        },
        Token::control(Tag::EndName),
    ];
    assert!(parse_tokens(&tokens).is_err());
}

#[test]
fn unterminated_list_fails() {
    let tokens = vec![Token::control(Tag::StartList)];
    assert!(parse_tokens(&tokens).is_err());
}

#[test]
fn unbalanced_end_fails() {
    let tokens = vec![Token::control(Tag::EndList)];
    assert!(parse_tokens(&tokens).is_err());
}

#[test]
fn strip_and_surround_are_inverse() -> Result<()> {
    let value = Value::List(vec![
        Value::from(1u8),
        Value::from(2u8),
        Value::bytes(b"x".to_vec()),
    ]);
    let stripped = encode_stream(&value, true)?;
    let full = encode_stream(&value, false)?;
    // The stripped form drops exactly the surrounding list brackets.
    assert_eq!(full.len(), stripped.len() + 2);
    assert_eq!(decode_stream(&stripped, true)?, value);
    Ok(())
}

#[test]
fn end_of_session_is_one_byte() -> Result<()> {
    let bytes = encode_stream(&Value::Command(Command::EndOfSession), false)?;
    assert_eq!(bytes, [0xFA]);
    Ok(())
}

#[test]
fn odd_width_atoms_widen_to_the_next_integer() -> Result<()> {
    // A 3-byte unsigned atom has no natural Rust width; it widens to u32.
    let tokens = decode_tokens(&[0b1000_0011, 0x01, 0x02, 0x03])?;
    let values = parse_tokens(&tokens)?;
    assert_eq!(values, vec![Value::Int(Int::U32(0x0001_0203))]);
    Ok(())
}

#[test]
fn bool_serializes_as_one_byte_integer() -> Result<()> {
    let bytes = encode_stream(&Value::from(true), false)?;
    assert_eq!(bytes, [0b1000_0001, 0x01]);
    Ok(())
}
