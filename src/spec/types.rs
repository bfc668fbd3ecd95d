// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt::Write;

use crate::models::uid::Uid;

/// Reference targets of the general (unrestricted) reference types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralRefKind {
    Object,
    Table,
    ByteTable,
}

/// Reference flavors that restrict their target to an explicit table list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictedRefKind {
    Object,
    Byte,
}

/// Schema node variants. Recast from the original's class hierarchy into a
/// tagged sum; the identified-type mix-in became the `uid` field of [`Type`].
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    /// A type whose layout is not modeled; values under it cannot be
    /// rendered.
    Unknown,
    Integer {
        width: usize,
        signed: bool,
    },
    /// Unsigned integer restricted to ranges, optionally with value labels.
    Enumeration {
        ranges: Vec<(u64, u64)>,
        labels: Vec<(u64, &'static str)>,
    },
    Bytes {
        length: usize,
        fixed: bool,
    },
    /// Ordered alternatives; each must be identified so the wire tag can
    /// select one.
    Alternative(Vec<Type>),
    List(Box<Type>),
    /// Set of unsigned integers out of the allowed ranges.
    Set(Vec<(u64, u64)>),
    /// Mandatory fields in order; optional fields are `NameValueUinteger`
    /// entries mixed into the field list.
    Struct(Vec<Type>),
    /// An optional struct field tagged on the wire by an integer name.
    NameValueUinteger {
        name: u64,
        value: Box<Type>,
    },
    RestrictedReference {
        kind: RestrictedRefKind,
        tables: Vec<Uid>,
    },
    GeneralReference(GeneralRefKind),
}

/// A schema node, optionally identified by a row of the Type table.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    uid: Option<Uid>,
    def: TypeDef,
}

impl Type {
    pub fn new(def: TypeDef) -> Type {
        Type { uid: None, def }
    }

    /// Attaches the Type-table UID this definition is registered under.
    pub fn identified(mut self, uid: Uid) -> Type {
        self.uid = Some(uid);
        self
    }

    pub fn uid(&self) -> Option<Uid> {
        self.uid
    }

    pub fn def(&self) -> &TypeDef {
        &self.def
    }

    pub fn unknown() -> Type {
        Type::new(TypeDef::Unknown)
    }

    pub fn unsigned(width: usize) -> Type {
        Type::new(TypeDef::Integer {
            width,
            signed: false,
        })
    }

    pub fn signed(width: usize) -> Type {
        Type::new(TypeDef::Integer {
            width,
            signed: true,
        })
    }

    pub fn enumeration(low: u64, high: u64) -> Type {
        Type::new(TypeDef::Enumeration {
            ranges: vec![(low, high)],
            labels: Vec::new(),
        })
    }

    pub fn enumeration_labeled(
        low: u64,
        high: u64,
        labels: &[(u64, &'static str)],
    ) -> Type {
        Type::new(TypeDef::Enumeration {
            ranges: vec![(low, high)],
            labels: labels.to_vec(),
        })
    }

    pub fn fixed_bytes(length: usize) -> Type {
        Type::new(TypeDef::Bytes {
            length,
            fixed: true,
        })
    }

    pub fn capped_bytes(length: usize) -> Type {
        Type::new(TypeDef::Bytes {
            length,
            fixed: false,
        })
    }

    pub fn alternative(types: Vec<Type>) -> Type {
        Type::new(TypeDef::Alternative(types))
    }

    pub fn list(element: Type) -> Type {
        Type::new(TypeDef::List(Box::new(element)))
    }

    pub fn set(low: u64, high: u64) -> Type {
        Type::new(TypeDef::Set(vec![(low, high)]))
    }

    pub fn struct_of(fields: Vec<Type>) -> Type {
        Type::new(TypeDef::Struct(fields))
    }

    pub fn name_value(name: u64, value: Type) -> Type {
        Type::new(TypeDef::NameValueUinteger {
            name,
            value: Box::new(value),
        })
    }

    pub fn object_ref() -> Type {
        Type::new(TypeDef::GeneralReference(GeneralRefKind::Object))
    }

    pub fn table_ref() -> Type {
        Type::new(TypeDef::GeneralReference(GeneralRefKind::Table))
    }

    pub fn byte_table_ref() -> Type {
        Type::new(TypeDef::GeneralReference(GeneralRefKind::ByteTable))
    }

    pub fn restricted_object_ref(tables: Vec<Uid>) -> Type {
        Type::new(TypeDef::RestrictedReference {
            kind: RestrictedRefKind::Object,
            tables,
        })
    }

    pub fn restricted_byte_ref(tables: Vec<Uid>) -> Type {
        Type::new(TypeDef::RestrictedReference {
            kind: RestrictedRefKind::Byte,
            tables,
        })
    }
}

/// Stable human rendering of a type, used in error messages.
pub fn format_type(ty: &Type) -> String {
    match ty.def() {
        TypeDef::Unknown => "unknown".to_string(),
        TypeDef::Integer { width, signed } => {
            format!("{}integer_{width}", if *signed { "" } else { "u" })
        },
        // Enumerations encode as their underlying 4-byte unsigned integer.
        TypeDef::Enumeration { .. } => "uinteger_4".to_string(),
        TypeDef::Bytes { length, fixed } => {
            format!("{}bytes_{length}", if *fixed { "" } else { "max_" })
        },
        TypeDef::Alternative(types) => {
            let mut out = String::from("typeOr{ ");
            for (index, alt) in types.iter().enumerate() {
                if let Some(uid) = alt.uid() {
                    let _ = write!(out, "{:08X}:", uid.0 as u32);
                }
                out.push_str(&format_type(alt));
                if index + 1 != types.len() {
                    out.push_str(" | ");
                }
            }
            out.push_str(" }");
            out
        },
        TypeDef::List(element) => format!("list{{ {} }}", format_type(element)),
        TypeDef::Set(ranges) => {
            let mut out = String::from("set{ ");
            for (index, (low, high)) in ranges.iter().enumerate() {
                let _ = write!(out, "{low}-{high}");
                if index + 1 != ranges.len() {
                    out.push_str(", ");
                }
            }
            out.push_str(" }");
            out
        },
        TypeDef::Struct(fields) => {
            let mut out = String::from("struct{ ");
            for (index, field) in fields.iter().enumerate() {
                out.push_str(&format_type(field));
                if index + 1 != fields.len() {
                    out.push_str(", ");
                }
            }
            out.push_str(" }");
            out
        },
        TypeDef::NameValueUinteger { name, value } => {
            format!("named{{ {name}: {} }}", format_type(value))
        },
        TypeDef::RestrictedReference { kind, tables } => {
            let mut out = String::from(match kind {
                RestrictedRefKind::Object => "objref{ ",
                RestrictedRefKind::Byte => "byteref{ ",
            });
            for (index, table) in tables.iter().enumerate() {
                match crate::spec::core::find_name(*table) {
                    Some(name) => out.push_str(&name),
                    None => out.push_str(&table.to_string()),
                }
                if index + 1 != tables.len() {
                    out.push_str(" | ");
                }
            }
            out.push_str(" }");
            out
        },
        TypeDef::GeneralReference(kind) => match kind {
            GeneralRefKind::Object => "objref".to_string(),
            GeneralRefKind::Table => "tableref".to_string(),
            GeneralRefKind::ByteTable => "byteref".to_string(),
        },
    }
}
