// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{models::uid::Uid, spec::types::Type};

/// Whether a table holds rows of typed columns or a flat byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Object,
    Byte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    pub name: String,
    pub is_unique: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDesc {
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnDesc>,
    pub single_row: Option<Uid>,
}

impl TableDesc {
    pub fn byte_table(name: impl Into<String>) -> TableDesc {
        TableDesc {
            name: name.into(),
            kind: TableKind::Byte,
            columns: Vec::new(),
            single_row: None,
        }
    }

    pub fn object_table(name: impl Into<String>) -> TableDesc {
        TableDesc {
            name: name.into(),
            kind: TableKind::Object,
            columns: Vec::new(),
            single_row: None,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDesc>) -> TableDesc {
        self.columns = columns;
        self
    }

    pub fn with_single_row(mut self, row: Uid) -> TableDesc {
        self.single_row = Some(row);
        self
    }
}
