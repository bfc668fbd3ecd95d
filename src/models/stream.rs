// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    error::{Error, Result},
    models::{
        token::{self, Tag, Token},
        value::{Command, Int, Named, Value},
    },
};

impl Command {
    const fn tag(self) -> Tag {
        match self {
            Command::Call => Tag::Call,
            Command::EndOfData => Tag::EndOfData,
            Command::EndOfSession => Tag::EndOfSession,
            Command::StartTransaction => Tag::StartTransaction,
            Command::EndTransaction => Tag::EndTransaction,
            Command::Empty => Tag::Empty,
        }
    }

    const fn from_tag(tag: Tag) -> Option<Command> {
        match tag {
            Tag::Call => Some(Command::Call),
            Tag::EndOfData => Some(Command::EndOfData),
            Tag::EndOfSession => Some(Command::EndOfSession),
            Tag::StartTransaction => Some(Command::StartTransaction),
            Tag::EndTransaction => Some(Command::EndTransaction),
            Tag::Empty => Some(Command::Empty),
            _ => None,
        }
    }
}

/// Depth-first serialization of a value into its token sequence.
///
/// Integers become SHORT atoms of their natural width, byte strings pick the
/// smallest fitting atom class, lists and named pairs are bracketed by their
/// control tokens.
pub fn emit_tokens(value: &Value, out: &mut Vec<Token>) -> Result<()> {
    match value {
        Value::Empty => Err(Error::invalid_format(
            "cannot serialize a value that holds nothing",
        )),
        Value::Int(int) => {
            out.push(Token {
                tag: Tag::Short,
                is_bytes: false,
                is_signed: int.is_signed(),
                data: int.to_be_bytes(),
            });
            Ok(())
        },
        Value::Bytes(bytes) => {
            out.push(Token {
                tag: Token::tag_for(bytes.len())?,
                is_bytes: true,
                is_signed: false,
                data: bytes.clone(),
            });
            Ok(())
        },
        Value::List(items) => {
            out.push(Token::control(Tag::StartList));
            for item in items {
                emit_tokens(item, out)?;
            }
            out.push(Token::control(Tag::EndList));
            Ok(())
        },
        Value::Named(named) => {
            out.push(Token::control(Tag::StartName));
            emit_tokens(&named.name, out)?;
            emit_tokens(&named.value, out)?;
            out.push(Token::control(Tag::EndName));
            Ok(())
        },
        Value::Command(command) => {
            out.push(Token::control(command.tag()));
            Ok(())
        },
    }
}

/// Leaf value for an atom token.
fn atom_to_value(token: &Token) -> Result<Value> {
    if token.is_bytes {
        if token.is_signed {
            return Err(Error::invalid_format("continued atoms are not supported"));
        }
        return Ok(Value::Bytes(token.data.clone()));
    }
    if token.data.is_empty() {
        return Err(Error::invalid_format("integer atom with no payload"));
    }
    let mut value: u64 = 0;
    for &byte in &token.data {
        value = value << 8 | u64::from(byte);
    }
    let int = match (token.is_signed, token.data.len()) {
        (true, 1) => Int::I8(value as u8 as i8),
        (true, 2) => Int::I16(value as u16 as i16),
        (true, 3..=4) => Int::I32(value as u32 as i32),
        (true, _) => Int::I64(value as i64),
        (false, 1) => Int::U8(value as u8),
        (false, 2) => Int::U16(value as u16),
        (false, 3..=4) => Int::U32(value as u32),
        (false, _) => Int::U64(value),
    };
    Ok(Value::Int(int))
}

enum Frame {
    List(Vec<Value>),
    Named {
        name: Option<Value>,
        value: Option<Value>,
    },
}

impl Frame {
    fn insert(&mut self, item: Value) -> Result<()> {
        match self {
            Frame::List(items) => {
                items.push(item);
                Ok(())
            },
            Frame::Named { name, value } => {
                if name.is_none() {
                    *name = Some(item);
                } else if value.is_none() {
                    *value = Some(item);
                } else {
                    return Err(Error::invalid_format(
                        "named items expect a single item as value",
                    ));
                }
                Ok(())
            },
        }
    }

    fn finish(self) -> Value {
        match self {
            Frame::List(items) => Value::List(items),
            Frame::Named { name, value } => Value::Named(Box::new(Named {
                name: name.unwrap_or(Value::Command(Command::Empty)),
                // An unfinished pair reads back as the EMPTY command.
                value: value.unwrap_or(Value::Command(Command::Empty)),
            })),
        }
    }
}

/// Push-down automaton over a token sequence. Returns the contents of the
/// bottom sentinel list once the stream is exhausted.
pub fn parse_tokens(tokens: &[Token]) -> Result<Vec<Value>> {
    let mut stack = vec![Frame::List(Vec::new())];

    for token in tokens {
        match token.tag {
            Tag::Empty => continue,
            Tag::StartList => stack.push(Frame::List(Vec::new())),
            Tag::StartName => stack.push(Frame::Named {
                name: None,
                value: None,
            }),
            Tag::EndList | Tag::EndName => {
                let frame = stack.pop().ok_or_else(|| {
                    Error::invalid_format("unbalanced end of list or name")
                })?;
                match (&frame, token.tag) {
                    (Frame::List(_), Tag::EndList) | (Frame::Named { .. }, Tag::EndName) => {},
                    _ => {
                        return Err(Error::invalid_format(
                            "mismatched container terminator",
                        ));
                    },
                }
                let item = frame.finish();
                let top = stack.last_mut().ok_or_else(|| {
                    Error::invalid_format("archive terminated improperly")
                })?;
                top.insert(item)?;
            },
            tag if tag.is_atom() => {
                let item = atom_to_value(token)?;
                let top = stack
                    .last_mut()
                    .ok_or_else(|| Error::invalid_format("archive terminated improperly"))?;
                top.insert(item)?;
            },
            tag => {
                let command = Command::from_tag(tag).ok_or_else(|| {
                    Error::invalid_format(format!("unexpected token tag {tag:?}"))
                })?;
                let top = stack
                    .last_mut()
                    .ok_or_else(|| Error::invalid_format("archive terminated improperly"))?;
                top.insert(Value::Command(command))?;
            },
        }
    }

    if stack.len() != 1 {
        return Err(Error::invalid_format("archive terminated improperly"));
    }
    match stack.remove(0).finish() {
        Value::List(items) => Ok(items),
        _ => Err(Error::invalid_format("archive terminated improperly")),
    }
}

/// Serializes a value into SubPacket payload bytes.
///
/// With `strip_outer_list` the value must be a list and its brackets are
/// omitted, which is how method calls travel: the stream carries the list
/// contents back to back.
pub fn encode_stream(value: &Value, strip_outer_list: bool) -> Result<Vec<u8>> {
    let mut tokens = Vec::new();
    if strip_outer_list {
        let items = value.get_list()?;
        for item in items {
            emit_tokens(item, &mut tokens)?;
        }
    } else {
        emit_tokens(value, &mut tokens)?;
    }
    token::encode_tokens(&tokens)
}

/// Parses SubPacket payload bytes back into a value.
///
/// With `surround_with_list` the parsed items are collected into one list
/// (the inverse of the stripping in [`encode_stream`]); otherwise the stream
/// must contain exactly one value.
pub fn decode_stream(bytes: &[u8], surround_with_list: bool) -> Result<Value> {
    let tokens = token::decode_tokens(bytes)?;
    let mut items = parse_tokens(&tokens)?;
    if surround_with_list {
        return Ok(Value::List(items));
    }
    if items.len() != 1 {
        return Err(Error::invalid_format(format!(
            "expected a single value in stream, got {}",
            items.len()
        )));
    }
    Ok(items.remove(0))
}
