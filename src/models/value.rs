// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use crate::{
    error::{Error, Result},
    models::uid::Uid,
};

/// Control tokens that may appear as standalone items in a message tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Call,
    EndOfData,
    EndOfSession,
    StartTransaction,
    EndTransaction,
    Empty,
}

/// An integer leaf. Width and signedness survive a codec round trip, so the
/// variant is part of the value's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Int {
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl Int {
    pub const fn is_signed(self) -> bool {
        matches!(self, Int::I8(_) | Int::I16(_) | Int::I32(_) | Int::I64(_))
    }

    pub const fn width(self) -> usize {
        match self {
            Int::Bool(_) | Int::I8(_) | Int::U8(_) => 1,
            Int::I16(_) | Int::U16(_) => 2,
            Int::I32(_) | Int::U32(_) => 4,
            Int::I64(_) | Int::U64(_) => 8,
        }
    }

    /// Natural-width big-endian representation, as placed into an atom.
    pub fn to_be_bytes(self) -> Vec<u8> {
        match self {
            Int::Bool(v) => vec![u8::from(v)],
            Int::I8(v) => v.to_be_bytes().to_vec(),
            Int::U8(v) => v.to_be_bytes().to_vec(),
            Int::I16(v) => v.to_be_bytes().to_vec(),
            Int::U16(v) => v.to_be_bytes().to_vec(),
            Int::I32(v) => v.to_be_bytes().to_vec(),
            Int::U32(v) => v.to_be_bytes().to_vec(),
            Int::I64(v) => v.to_be_bytes().to_vec(),
            Int::U64(v) => v.to_be_bytes().to_vec(),
        }
    }

    pub fn as_u64(self) -> Result<u64> {
        match self {
            Int::Bool(v) => Ok(u64::from(v)),
            Int::U8(v) => Ok(u64::from(v)),
            Int::U16(v) => Ok(u64::from(v)),
            Int::U32(v) => Ok(u64::from(v)),
            Int::U64(v) => Ok(v),
            Int::I8(v) if v >= 0 => Ok(v as u64),
            Int::I16(v) if v >= 0 => Ok(v as u64),
            Int::I32(v) if v >= 0 => Ok(v as u64),
            Int::I64(v) if v >= 0 => Ok(v as u64),
            _ => Err(Error::invalid_type("uinteger", "negative integer")),
        }
    }

    pub fn as_i64(self) -> Result<i64> {
        match self {
            Int::Bool(v) => Ok(i64::from(v)),
            Int::I8(v) => Ok(i64::from(v)),
            Int::I16(v) => Ok(i64::from(v)),
            Int::I32(v) => Ok(i64::from(v)),
            Int::I64(v) => Ok(v),
            Int::U8(v) => Ok(i64::from(v)),
            Int::U16(v) => Ok(i64::from(v)),
            Int::U32(v) => Ok(i64::from(v)),
            Int::U64(v) => i64::try_from(v)
                .map_err(|_| Error::invalid_type("integer", "uinteger_8 out of range")),
        }
    }
}

/// A name-value pair. The name is typically an integer (optional argument
/// keys, struct field tags) or a byte string (property maps).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Named {
    pub name: Value,
    pub value: Value,
}

/// The dynamically typed tree every message is built from. A value
/// exclusively owns its children; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Empty,
    Int(Int),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Named(Box<Named>),
    Command(Command),
}

impl Value {
    pub fn named(name: impl Into<Value>, value: impl Into<Value>) -> Value {
        Value::Named(Box::new(Named {
            name: name.into(),
            value: value.into(),
        }))
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Bytes(bytes.into())
    }

    pub fn list(items: impl Into<Vec<Value>>) -> Value {
        Value::List(items.into())
    }

    pub const fn is_integer(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub const fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub const fn is_named(&self) -> bool {
        matches!(self, Value::Named(_))
    }

    pub const fn is_command(&self) -> bool {
        matches!(self, Value::Command(_))
    }

    pub const fn has_value(&self) -> bool {
        !matches!(self, Value::Empty)
    }

    /// Short type description used in conversion errors.
    pub fn type_str(&self) -> String {
        match self {
            Value::Empty => "empty".into(),
            Value::Int(int) => format!(
                "{}int{}",
                if int.is_signed() { "" } else { "u" },
                int.width() * 8
            ),
            Value::Bytes(bytes) => format!("bytes[{}]", bytes.len()),
            Value::List(items) => format!("list[{}]", items.len()),
            Value::Named(_) => "named".into(),
            Value::Command(command) => format!("command({command:?})"),
        }
    }

    pub fn get_int(&self) -> Result<Int> {
        match self {
            Value::Int(int) => Ok(*int),
            other => Err(Error::invalid_type("integer", other.type_str())),
        }
    }

    pub fn get_uint(&self) -> Result<u64> {
        self.get_int()?.as_u64()
    }

    pub fn get_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(Error::invalid_type("bytes", other.type_str())),
        }
    }

    pub fn get_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Error::invalid_type("list", other.type_str())),
        }
    }

    pub fn get_named(&self) -> Result<&Named> {
        match self {
            Value::Named(named) => Ok(named),
            other => Err(Error::invalid_type("named", other.type_str())),
        }
    }

    pub fn get_command(&self) -> Result<Command> {
        match self {
            Value::Command(command) => Ok(*command),
            other => Err(Error::invalid_type("command", other.type_str())),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Error::invalid_type("list", other.type_str())),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(Error::invalid_type("bytes", other.type_str())),
        }
    }

    pub fn into_named(self) -> Result<Named> {
        match self {
            Value::Named(named) => Ok(*named),
            other => Err(Error::invalid_type("named", other.type_str())),
        }
    }

    /// Reads an 8-byte bytes value as a UID.
    pub fn get_uid(&self) -> Result<Uid> {
        Uid::from_be_bytes(self.get_bytes()?)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Call => "CALL",
            Command::EndOfData => "END_OF_DATA",
            Command::EndOfSession => "END_OF_SESSION",
            Command::StartTransaction => "START_TRANSACTION",
            Command::EndTransaction => "END_TRANSACTION",
            Command::Empty => "EMPTY",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Int::Bool(v) => write!(f, "{v}"),
            Int::I8(v) => write!(f, "{v}"),
            Int::U8(v) => write!(f, "{v}"),
            Int::I16(v) => write!(f, "{v}"),
            Int::U16(v) => write!(f, "{v}"),
            Int::I32(v) => write!(f, "{v}"),
            Int::U32(v) => write!(f, "{v}"),
            Int::I64(v) => write!(f, "{v}"),
            Int::U64(v) => write!(f, "{v}"),
        }
    }
}

/// Compact single-line rendering of a message tree, used when logging the
/// packet path. Long byte strings are truncated.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_SHOWN_BYTES: usize = 32;
        match self {
            Value::Empty => f.write_str("<empty>"),
            Value::Int(int) => write!(f, "{int}"),
            Value::Bytes(bytes) => {
                f.write_str("[ ")?;
                for byte in bytes.iter().take(MAX_SHOWN_BYTES) {
                    write!(f, "{byte:02X} ")?;
                }
                if bytes.len() > MAX_SHOWN_BYTES {
                    f.write_str("... ")?;
                }
                f.write_str("]")
            },
            Value::List(items) => {
                f.write_str("{ ")?;
                for (index, item) in items.iter().enumerate() {
                    write!(f, "{item}")?;
                    if index + 1 != items.len() {
                        f.write_str(", ")?;
                    }
                }
                f.write_str(" }")
            },
            Value::Named(named) => write!(f, "({} = {})", named.name, named.value),
            Value::Command(command) => write!(f, "{command}"),
        }
    }
}

impl From<Int> for Value {
    fn from(value: Int) -> Self {
        Value::Int(value)
    }
}

impl From<Command> for Value {
    fn from(value: Command) -> Self {
        Value::Command(value)
    }
}

impl From<Named> for Value {
    fn from(value: Named) -> Self {
        Value::Named(Box::new(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Uid> for Value {
    fn from(value: Uid) -> Self {
        Value::Bytes(value.to_be_bytes().to_vec())
    }
}

macro_rules! impl_from_int {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Int(Int::$variant(value))
                }
            }
        )*
    };
}

impl_from_int! {
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
}
