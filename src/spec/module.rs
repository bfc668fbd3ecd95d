// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use crate::{models::uid::Uid, spec::tables::TableDesc, spec::types::Type};

/// Lookup precedence between module categories: features are consulted
/// before SSCs, SSCs before the core fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ModuleKind {
    Feature,
    Ssc,
    Core,
}

/// A self-contained slice of the specification: preconfigured names, table
/// descriptors, and type definitions.
pub trait Module: Send + Sync {
    fn module_name(&self) -> &'static str;
    fn module_kind(&self) -> ModuleKind;

    fn find_name(&self, _uid: Uid, _sp: Option<Uid>) -> Option<String> {
        None
    }

    fn find_uid(&self, _name: &str, _sp: Option<Uid>) -> Option<Uid> {
        None
    }

    fn find_table(&self, _table: Uid) -> Option<TableDesc> {
        None
    }

    fn find_type(&self, _uid: Uid) -> Option<Type> {
        None
    }

    /// Feature modules this module pulls in with itself.
    fn features(&self) -> Vec<Arc<dyn Module>> {
        Vec::new()
    }
}

/// The modules loaded for one device. Enumeration is deterministic: sorted
/// by name, deduplicated, then stable-sorted by kind so that lookup tries
/// features first and core last.
#[derive(Default, Clone)]
pub struct ModuleCollection {
    modules: Vec<Arc<dyn Module>>,
}

impl ModuleCollection {
    pub fn new() -> ModuleCollection {
        ModuleCollection::default()
    }

    pub fn load(&mut self, module: Arc<dyn Module>) {
        for feature in module.features() {
            self.load(feature);
        }
        self.modules.push(module);
        self.modules
            .sort_by(|lhs, rhs| lhs.module_name().cmp(rhs.module_name()));
        self.modules
            .dedup_by(|lhs, rhs| lhs.module_name() == rhs.module_name());
        self.modules
            .sort_by_key(|module| module.module_kind());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.iter()
    }

    pub fn find_name(&self, uid: Uid, sp: Option<Uid>) -> Option<String> {
        self.modules
            .iter()
            .find_map(|module| module.find_name(uid, sp))
    }

    /// Pretty name when one is known, canonical hex otherwise.
    pub fn name_or_uid(&self, uid: Uid, sp: Option<Uid>) -> String {
        self.find_name(uid, sp)
            .unwrap_or_else(|| uid.to_string())
    }

    pub fn find_uid(&self, name: &str, sp: Option<Uid>) -> Option<Uid> {
        self.modules
            .iter()
            .find_map(|module| module.find_uid(name, sp))
    }

    pub fn find_table(&self, table: Uid) -> Option<TableDesc> {
        self.modules
            .iter()
            .find_map(|module| module.find_table(table))
    }

    pub fn find_type(&self, uid: Uid) -> Option<Type> {
        self.modules
            .iter()
            .find_map(|module| module.find_type(uid))
    }
}
