// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::collections::BTreeMap;

use crate::{
    error::{Error, Result},
    models::{
        uid::Uid,
        value::{Command, Value},
    },
};

/// One-byte method status codes of the TCG core specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodStatus {
    Success,
    NotAuthorized,
    Obsolete,
    SpBusy,
    SpFailed,
    SpDisabled,
    SpFrozen,
    NoSessionsAvailable,
    UniquenessConflict,
    InsufficientSpace,
    InsufficientRows,
    InvalidParameter,
    Obsolete1,
    Obsolete2,
    TperMalfunction,
    TransactionFailure,
    ResponseOverflow,
    AuthorityLockedOut,
    Fail,
    Unrecognized(u8),
}

impl MethodStatus {
    pub const fn from_wire(value: u8) -> MethodStatus {
        match value {
            0x00 => MethodStatus::Success,
            0x01 => MethodStatus::NotAuthorized,
            0x02 => MethodStatus::Obsolete,
            0x03 => MethodStatus::SpBusy,
            0x04 => MethodStatus::SpFailed,
            0x05 => MethodStatus::SpDisabled,
            0x06 => MethodStatus::SpFrozen,
            0x07 => MethodStatus::NoSessionsAvailable,
            0x08 => MethodStatus::UniquenessConflict,
            0x09 => MethodStatus::InsufficientSpace,
            0x0A => MethodStatus::InsufficientRows,
            0x0C => MethodStatus::InvalidParameter,
            0x0D => MethodStatus::Obsolete1,
            0x0E => MethodStatus::Obsolete2,
            0x0F => MethodStatus::TperMalfunction,
            0x10 => MethodStatus::TransactionFailure,
            0x11 => MethodStatus::ResponseOverflow,
            0x12 => MethodStatus::AuthorityLockedOut,
            0x3F => MethodStatus::Fail,
            other => MethodStatus::Unrecognized(other),
        }
    }

    pub const fn to_wire(self) -> u8 {
        match self {
            MethodStatus::Success => 0x00,
            MethodStatus::NotAuthorized => 0x01,
            MethodStatus::Obsolete => 0x02,
            MethodStatus::SpBusy => 0x03,
            MethodStatus::SpFailed => 0x04,
            MethodStatus::SpDisabled => 0x05,
            MethodStatus::SpFrozen => 0x06,
            MethodStatus::NoSessionsAvailable => 0x07,
            MethodStatus::UniquenessConflict => 0x08,
            MethodStatus::InsufficientSpace => 0x09,
            MethodStatus::InsufficientRows => 0x0A,
            MethodStatus::InvalidParameter => 0x0C,
            MethodStatus::Obsolete1 => 0x0D,
            MethodStatus::Obsolete2 => 0x0E,
            MethodStatus::TperMalfunction => 0x0F,
            MethodStatus::TransactionFailure => 0x10,
            MethodStatus::ResponseOverflow => 0x11,
            MethodStatus::AuthorityLockedOut => 0x12,
            MethodStatus::Fail => 0x3F,
            MethodStatus::Unrecognized(other) => other,
        }
    }

    pub const fn text(self) -> &'static str {
        match self {
            MethodStatus::Success => "success",
            MethodStatus::NotAuthorized => "not authorized",
            MethodStatus::Obsolete => "obsolete",
            MethodStatus::SpBusy => "security provider busy",
            MethodStatus::SpFailed => "security provider failed",
            MethodStatus::SpDisabled => "security provider disabled",
            MethodStatus::SpFrozen => "security provider frozen",
            MethodStatus::NoSessionsAvailable => "no sessions available",
            MethodStatus::UniquenessConflict => "uniqueness conflict",
            MethodStatus::InsufficientSpace => "insufficient space",
            MethodStatus::InsufficientRows => "insufficient rows",
            MethodStatus::InvalidParameter => "invalid argument",
            MethodStatus::Obsolete1 => "obsolete 1",
            MethodStatus::Obsolete2 => "obsolete 2",
            MethodStatus::TperMalfunction => "trusted peripheral malfunction",
            MethodStatus::TransactionFailure => "transaction failure",
            MethodStatus::ResponseOverflow => "response overflow",
            MethodStatus::AuthorityLockedOut => "authority locked out",
            MethodStatus::Fail => "unspecified failure",
            MethodStatus::Unrecognized(_) => "unrecognized status code",
        }
    }

    /// Maps a non-SUCCESS status to its error, using the status-derived
    /// aliases where the taxonomy has one.
    pub fn into_error(self, method_name: &str) -> Error {
        match self {
            MethodStatus::NotAuthorized => Error::NotAuthorized,
            MethodStatus::SpBusy => Error::SecurityProviderBusy,
            MethodStatus::SpFailed => Error::SecurityProviderFailed,
            MethodStatus::SpDisabled => Error::SecurityProviderDisabled,
            MethodStatus::SpFrozen => Error::SecurityProviderFrozen,
            status => Error::Invocation {
                method: method_name.to_string(),
                status: status.text().to_string(),
            },
        }
    }
}

/// Raises the status as an error unless it is SUCCESS.
pub fn check_status(method_name: &str, status: MethodStatus) -> Result<()> {
    if status == MethodStatus::Success {
        return Ok(());
    }
    Err(status.into_error(method_name))
}

/// A method invocation addressed to an object (or the session manager).
///
/// Wire form:
/// `[ CALL, <invokingId:8B>, <methodId:8B>, [ args… ], EOD, [ status, 0, 0 ] ]`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub invoking_id: Uid,
    pub method_id: Uid,
    pub args: Vec<Value>,
    pub status: MethodStatus,
}

impl MethodCall {
    pub fn new(invoking_id: Uid, method_id: Uid, args: Vec<Value>) -> MethodCall {
        MethodCall {
            invoking_id,
            method_id,
            args,
            status: MethodStatus::Success,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::List(vec![
            Value::Command(Command::Call),
            Value::from(self.invoking_id),
            Value::from(self.method_id),
            Value::List(self.args.clone()),
            Value::Command(Command::EndOfData),
            status_list(self.status),
        ])
    }

    pub fn from_value(value: &Value) -> Result<MethodCall> {
        let content = value.get_list()?;
        if content.len() < 6 {
            return Err(Error::invalid_format(
                "method stream must contain CALL, invoking ID, method ID, arg list, \
                 EOD, and status list",
            ));
        }
        if content[0].get_command()? != Command::Call {
            return Err(Error::invalid_format("expected a leading call token"));
        }
        let invoking_id = content[1].get_uid()?;
        let method_id = content[2].get_uid()?;
        let args = content[3].get_list()?.to_vec();
        if content[4].get_command()? != Command::EndOfData {
            return Err(Error::invalid_format(
                "expected an end of data token after arg list",
            ));
        }
        let status = parse_status_list(&content[5])?;
        Ok(MethodCall {
            invoking_id,
            method_id,
            args,
            status,
        })
    }
}

/// The reply side of an invocation.
///
/// Wire form: `[ [ values… ], EOD, [ status, 0, 0 ] ]`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodResult {
    pub values: Vec<Value>,
    pub status: MethodStatus,
}

impl MethodResult {
    pub fn to_value(&self) -> Value {
        Value::List(vec![
            Value::List(self.values.clone()),
            Value::Command(Command::EndOfData),
            status_list(self.status),
        ])
    }

    /// Parses a result stream. A top-level CALL means the TPer invoked a
    /// method on the host; the only recognized one is CloseSession, which is
    /// surfaced as the session-terminated error.
    pub fn from_value(value: &Value) -> Result<MethodResult> {
        let content = value.get_list()?;
        if content.len() < 3 {
            return Err(Error::invalid_format(
                "method result stream must contain result list, EOD, and status list",
            ));
        }

        if content[0].get_command().is_ok_and(|c| c == Command::Call) {
            let call = MethodCall::from_value(value).map_err(|err| {
                Error::invalid_format(format!(
                    "failed to parse results (result was a call): {err}"
                ))
            })?;
            if call.method_id == crate::spec::core::method::CLOSE_SESSION {
                return Err(Error::SessionTerminated(call.status));
            }
            return Err(Error::invalid_format(format!(
                "unexpected method call from TPer: {}",
                call.method_id
            )));
        }

        let values = content[0].get_list()?.to_vec();
        if content[1].get_command()? != Command::EndOfData {
            return Err(Error::invalid_format(
                "expected an end of data token after result list",
            ));
        }
        let status = parse_status_list(&content[2])?;
        Ok(MethodResult { values, status })
    }
}

fn status_list(status: MethodStatus) -> Value {
    Value::List(vec![
        Value::from(status.to_wire()),
        Value::from(0u8),
        Value::from(0u8),
    ])
}

fn parse_status_list(value: &Value) -> Result<MethodStatus> {
    let list = value.get_list()?;
    if list.len() != 3 {
        return Err(Error::invalid_format("status list must have 3 elements"));
    }
    Ok(MethodStatus::from_wire(list[0].get_uint()? as u8))
}

//------------------------------------------------------------------------------
// Argument packing
//------------------------------------------------------------------------------

/// Builds a method argument list: required arguments travel positionally,
/// present optional arguments are wrapped as `Named { key, value }` with
/// keys counted from 0 in declaration order.
pub fn pack_args(
    required: Vec<Value>,
    optional: Vec<Option<Value>>,
) -> Vec<Value> {
    let mut args = required;
    for (key, slot) in optional.into_iter().enumerate() {
        if let Some(value) = slot {
            args.push(Value::named(key as u32, value));
        }
    }
    args
}

/// Inverse of [`pack_args`]: splits a result list into its required slots
/// (in order) and the optional slots addressed by key.
///
/// A required slot holding a named value, an optional slot holding a
/// non-named value, or an unknown optional key all fail.
pub fn unpack_args(
    values: &[Value],
    required_count: usize,
    optional_keys: &[u32],
) -> Result<(Vec<Value>, Vec<Option<Value>>)> {
    if values.len() < required_count {
        return Err(Error::invalid_format(format!(
            "expected at least {required_count} arguments, got {}",
            values.len()
        )));
    }

    let mut required = Vec::with_capacity(required_count);
    for value in &values[..required_count] {
        if value.is_named() {
            return Err(Error::invalid_format(format!(
                "expected mandatory argument as argument {}",
                required.len()
            )));
        }
        required.push(value.clone());
    }

    let mut optional: Vec<Option<Value>> = vec![None; optional_keys.len()];
    for value in &values[required_count..] {
        let named = value.get_named().map_err(|_| {
            Error::invalid_format("expected named values for optional arguments")
        })?;
        let key = named.name.get_uint().map_err(|_| {
            Error::invalid_format("expected an integer as argument label")
        })?;
        let slot = optional_keys
            .iter()
            .position(|&candidate| u64::from(candidate) == key)
            .ok_or_else(|| {
                Error::invalid_format(format!("unexpected optional argument key {key}"))
            })?;
        optional[slot] = Some(named.value.clone());
    }

    Ok((required, optional))
}

//------------------------------------------------------------------------------
// Property maps
//------------------------------------------------------------------------------

/// Host and TPer properties exchanged by the session manager.
pub type PropertyMap = BTreeMap<String, u32>;

pub fn properties_to_value(properties: &PropertyMap) -> Value {
    let items = properties
        .iter()
        .map(|(name, value)| Value::named(name.as_bytes(), *value))
        .collect::<Vec<_>>();
    Value::List(items)
}

pub fn properties_from_value(value: &Value) -> Result<PropertyMap> {
    let mut properties = PropertyMap::new();
    for item in value.get_list()? {
        let named = item.get_named()?;
        let name = String::from_utf8(named.name.get_bytes()?.to_vec())
            .map_err(|_| Error::invalid_format("property name is not valid UTF-8"))?;
        properties.insert(name, named.value.get_uint()? as u32);
    }
    Ok(properties)
}
