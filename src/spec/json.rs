// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use serde_json::{Map, Value as Json, json};

use crate::{
    error::{Error, Result},
    models::{
        uid::Uid,
        value::{Named, Value},
    },
    spec::{
        core,
        types::{Type, TypeDef, format_type},
    },
    utils::{format_hex_bytes, parse_hex_bytes},
};

/// Resolves a UID to a pretty name for rendering references.
pub type NameOf<'a> = &'a dyn Fn(Uid) -> Option<String>;
/// Resolves a pretty name back to a UID when parsing references.
pub type UidOf<'a> = &'a dyn Fn(&str) -> Option<Uid>;

/// The Type-table namespace alternatives are tagged in: the wire carries the
/// low 4 bytes, the high half is fixed.
const TYPE_TABLE_BASE: u64 = 0x0000_0005_0000_0000;

fn type_mismatch(ty: &Type, value: &Value) -> Error {
    Error::invalid_type(format_type(ty), value.type_str())
}

fn json_mismatch(expected: &str, json: &Json) -> Error {
    Error::invalid_type(expected, json_type_str(json))
}

fn json_type_str(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Whether a bytes type renders as a plain string rather than hex. Only the
/// identified `name` and `password` types do.
fn interpret_as_string(ty: &Type) -> bool {
    matches!(ty.uid(), Some(uid) if uid == core::type_uid::NAME || uid == core::type_uid::PASSWORD)
}

fn split_struct_fields(fields: &[Type]) -> (Vec<&Type>, Vec<(u64, &Type)>) {
    let mut mandatory = Vec::new();
    let mut optional = Vec::new();
    for field in fields {
        match field.def() {
            TypeDef::NameValueUinteger { name, value } => optional.push((*name, &**value)),
            _ => mandatory.push(field),
        }
    }
    (mandatory, optional)
}

fn reference_to_json(uid: Uid, name_of: Option<NameOf<'_>>) -> Json {
    if let Some(name_of) = name_of {
        if let Some(name) = name_of(uid) {
            return Json::String(format!("ref:{name}"));
        }
    }
    Json::String(format!("ref:{uid}"))
}

fn reference_from_json(json: &Json, uid_of: Option<UidOf<'_>>) -> Result<Uid> {
    let text = json
        .as_str()
        .ok_or_else(|| json_mismatch("string", json))?;
    let reference = text
        .strip_prefix("ref:")
        .ok_or_else(|| Error::invalid_format("reference must be prefixed by 'ref:'"))?;
    if let Some(uid_of) = uid_of {
        if let Some(uid) = uid_of(reference) {
            return Ok(uid);
        }
    }
    Uid::parse(reference)
        .ok_or_else(|| Error::invalid_format(format!("unknown reference '{reference}'")))
}

fn find_alternative<'a>(alternatives: &'a [Type], uid: Uid) -> Result<&'a Type> {
    for alt in alternatives {
        match alt.uid() {
            Some(alt_uid) if alt_uid == uid => return Ok(alt),
            Some(_) => {},
            None => {
                return Err(Error::invalid_type(
                    "<any identified type>",
                    format_type(alt),
                ));
            },
        }
    }
    Err(Error::invalid_type(
        format!("typeOr with alternative {uid}"),
        format!("uid:{uid}"),
    ))
}

/// Renders a value as JSON under the given type. `name_of` supplies pretty
/// names for references; without it UIDs print as hex.
pub fn value_to_json(
    value: &Value,
    ty: &Type,
    name_of: Option<NameOf<'_>>,
) -> Result<Json> {
    match ty.def() {
        TypeDef::Unknown => Err(Error::NotImplemented(
            "values of unknown type cannot be rendered".to_string(),
        )),
        TypeDef::Enumeration { labels, .. } => {
            let number = value.get_int().map_err(|_| type_mismatch(ty, value))?.as_u64()?;
            if let Some((_, label)) = labels.iter().find(|(v, _)| *v == number) {
                return Ok(Json::String((*label).to_string()));
            }
            Ok(json!(number))
        },
        TypeDef::Integer { signed, .. } => {
            let int = value.get_int().map_err(|_| type_mismatch(ty, value))?;
            if *signed {
                Ok(json!(int.as_i64()?))
            } else {
                Ok(json!(int.as_u64()?))
            }
        },
        TypeDef::Bytes { .. } => {
            let bytes = value.get_bytes().map_err(|_| type_mismatch(ty, value))?;
            if interpret_as_string(ty) {
                Ok(Json::String(
                    String::from_utf8_lossy(bytes).into_owned(),
                ))
            } else {
                Ok(Json::String(format_hex_bytes(bytes, "")))
            }
        },
        TypeDef::Alternative(alternatives) => {
            let named = value.get_named().map_err(|_| type_mismatch(ty, value))?;
            let tag = named
                .name
                .get_bytes()
                .map_err(|_| type_mismatch(&Type::fixed_bytes(4), &named.name))?;
            let tag: [u8; 4] = tag.try_into().map_err(|_| {
                Error::invalid_format("alternative selector must be 4 bytes")
            })?;
            let alt_uid = Uid(TYPE_TABLE_BASE | u64::from(u32::from_be_bytes(tag)));
            let alt = find_alternative(alternatives, alt_uid)?;
            let key = reference_to_json(alt_uid, name_of);
            let Json::String(key) = key else {
                return Err(Error::invalid_format("reference did not render as text"));
            };
            let mut object = Map::new();
            object.insert(key, value_to_json(&named.value, alt, name_of)?);
            Ok(Json::Object(object))
        },
        TypeDef::List(element) => {
            let items = value.get_list().map_err(|_| type_mismatch(ty, value))?;
            items
                .iter()
                .map(|item| value_to_json(item, element, name_of))
                .collect::<Result<Vec<_>>>()
                .map(Json::Array)
        },
        TypeDef::Set(_) => {
            let items = value.get_list().map_err(|_| type_mismatch(ty, value))?;
            items
                .iter()
                .map(|item| Ok(json!(item.get_uint()?)))
                .collect::<Result<Vec<_>>>()
                .map(Json::Array)
        },
        TypeDef::Struct(fields) => {
            let elements = value.get_list().map_err(|_| type_mismatch(ty, value))?;
            let (mandatory_types, optional_types) = split_struct_fields(fields);
            let mandatory: Vec<&Value> =
                elements.iter().filter(|v| !v.is_named()).collect();
            if mandatory.len() != mandatory_types.len() {
                return Err(Error::invalid_type(
                    format_type(ty),
                    format!("struct with {} mandatory fields", mandatory.len()),
                ));
            }

            let mut out = Vec::new();
            for (element, field_type) in mandatory.iter().zip(&mandatory_types) {
                out.push(value_to_json(element, field_type, name_of)?);
            }
            for element in elements.iter().filter(|v| v.is_named()) {
                let named = element.get_named()?;
                let key = named.name.get_uint().map_err(|_| {
                    Error::invalid_format(
                        "optional element of struct type must have an integer key",
                    )
                })?;
                let field_type = optional_types
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, ty)| *ty)
                    .ok_or_else(|| {
                        Error::invalid_format(format!(
                            "unexpected optional struct element with key {key}"
                        ))
                    })?;
                out.push(json!({
                    "field": key,
                    "value": value_to_json(&named.value, field_type, name_of)?,
                }));
            }
            Ok(Json::Array(out))
        },
        TypeDef::RestrictedReference { .. } | TypeDef::GeneralReference(_) => {
            let uid = value.get_uid().map_err(|_| type_mismatch(ty, value))?;
            Ok(reference_to_json(uid, name_of))
        },
        TypeDef::NameValueUinteger { name, value: value_type } => {
            let named = value.get_named().map_err(|_| type_mismatch(ty, value))?;
            let wire_name = named
                .name
                .get_uint()
                .map_err(|_| Error::invalid_type("integer", named.name.type_str()))?;
            if wire_name != *name {
                return Err(Error::invalid_type(
                    format!("named{{ {name}: … }}"),
                    format!("named{{ {wire_name}: … }}"),
                ));
            }
            Ok(json!({
                "name": name,
                "value": value_to_json(&named.value, value_type, name_of)?,
            }))
        },
    }
}

/// Parses a JSON rendering back into a value; the inverse of
/// [`value_to_json`].
pub fn json_to_value(json: &Json, ty: &Type, uid_of: Option<UidOf<'_>>) -> Result<Value> {
    match ty.def() {
        TypeDef::Unknown => Err(Error::NotImplemented(
            "values of unknown type cannot be parsed".to_string(),
        )),
        TypeDef::Enumeration { labels, .. } => {
            if let Some(text) = json.as_str() {
                let (value, _) = labels
                    .iter()
                    .find(|(_, label)| *label == text)
                    .ok_or_else(|| {
                        Error::invalid_format(format!("invalid enumeration value '{text}'"))
                    })?;
                return Ok(Value::from(*value as u16));
            }
            let number = json
                .as_u64()
                .ok_or_else(|| json_mismatch("{ string | int }", json))?;
            Ok(Value::from(number as u16))
        },
        TypeDef::Integer { width, signed } => {
            if *signed {
                let number = json
                    .as_i64()
                    .ok_or_else(|| json_mismatch("integer", json))?;
                Ok(match width {
                    1 => Value::from(number as i8),
                    2 => Value::from(number as i16),
                    4 => Value::from(number as i32),
                    _ => Value::from(number),
                })
            } else {
                let number = json
                    .as_u64()
                    .ok_or_else(|| json_mismatch("integer", json))?;
                Ok(match width {
                    1 => Value::from(number as u8),
                    2 => Value::from(number as u16),
                    4 => Value::from(number as u32),
                    _ => Value::from(number),
                })
            }
        },
        TypeDef::Bytes { .. } => {
            let text = json
                .as_str()
                .ok_or_else(|| json_mismatch("string", json))?;
            if interpret_as_string(ty) {
                Ok(Value::Bytes(text.as_bytes().to_vec()))
            } else {
                Ok(Value::Bytes(parse_hex_bytes(text, "")?))
            }
        },
        TypeDef::Alternative(alternatives) => {
            let object = json
                .as_object()
                .filter(|object| !object.is_empty())
                .ok_or_else(|| json_mismatch("object: { type: value }", json))?;
            let (key, inner) = object
                .iter()
                .next()
                .ok_or_else(|| json_mismatch("object: { type: value }", json))?;
            let alt_uid = reference_from_json(&Json::String(key.clone()), uid_of)?;
            let alt = find_alternative(alternatives, alt_uid)?;
            Ok(Value::from(Named {
                name: Value::Bytes((alt_uid.0 as u32).to_be_bytes().to_vec()),
                value: json_to_value(inner, alt, uid_of)?,
            }))
        },
        TypeDef::List(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| json_mismatch("list", json))?;
            let values = items
                .iter()
                .map(|item| json_to_value(item, element, uid_of))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(values))
        },
        TypeDef::Set(_) => {
            let items = json
                .as_array()
                .ok_or_else(|| json_mismatch("list", json))?;
            let values = items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .map(|number| Value::from(number as u32))
                        .ok_or_else(|| json_mismatch("integer", item))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(values))
        },
        TypeDef::Struct(fields) => {
            let elements = json
                .as_array()
                .ok_or_else(|| json_mismatch("list", json))?;
            let (mandatory_types, optional_types) = split_struct_fields(fields);
            let is_optional = |element: &Json| {
                element.get("field").is_some() && element.get("value").is_some()
            };

            let mandatory: Vec<&Json> =
                elements.iter().filter(|e| !is_optional(e)).collect();
            if mandatory.len() != mandatory_types.len() {
                return Err(Error::invalid_type(
                    format_type(ty),
                    format!("struct with {} mandatory fields", mandatory.len()),
                ));
            }

            let mut values = Vec::new();
            for (element, field_type) in mandatory.iter().zip(&mandatory_types) {
                values.push(json_to_value(element, field_type, uid_of)?);
            }
            for element in elements.iter().filter(|e| is_optional(e)) {
                let key = element["field"].as_u64().ok_or_else(|| {
                    Error::invalid_format(
                        "optional element of struct type must have an integer key",
                    )
                })?;
                let field_type = optional_types
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, ty)| *ty)
                    .ok_or_else(|| {
                        Error::invalid_format(format!(
                            "unexpected optional struct element with key {key}"
                        ))
                    })?;
                values.push(Value::named(
                    key as u16,
                    json_to_value(&element["value"], field_type, uid_of)?,
                ));
            }
            Ok(Value::List(values))
        },
        TypeDef::RestrictedReference { .. } | TypeDef::GeneralReference(_) => {
            let uid = reference_from_json(json, uid_of)?;
            Ok(Value::from(uid))
        },
        TypeDef::NameValueUinteger { name, value: value_type } => {
            let (name_json, value_json) = match (json.get("name"), json.get("value")) {
                (Some(name), Some(value)) => (name, value),
                _ => {
                    return Err(json_mismatch(
                        r#"object: { "name": …, "value": … }"#,
                        json,
                    ));
                },
            };
            let wire_name = name_json
                .as_u64()
                .ok_or_else(|| json_mismatch("integer", name_json))?;
            if wire_name != *name {
                return Err(Error::invalid_type(
                    format!("named{{ {name}: … }}"),
                    format!("named{{ {wire_name}: … }}"),
                ));
            }
            Ok(Value::named(
                wire_name as u16,
                json_to_value(value_json, value_type, uid_of)?,
            ))
        },
    }
}
