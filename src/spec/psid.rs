// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    models::uid::Uid,
    spec::{
        module::{Module, ModuleKind},
        names::NameAndUidFinder,
    },
};

/// The physical-presence authority printed on the drive label.
pub const AUTHORITY_PSID: Uid = Uid(0x0000_0009_0001_FF01);
pub const C_PIN_PSID: Uid = Uid(0x0000_000B_0001_FF01);

static NAMES: &[(Uid, &str)] = &[
    (AUTHORITY_PSID, "Authority::PSID"),
    (C_PIN_PSID, "C_PIN::PSID"),
    (Uid(0x0000_0008_0001_00E1), "ACE::C_PIN_Get_PSID_NoPIN"),
    (Uid(0x0000_0008_0001_00E0), "ACE::SP_PSID"),
];

static FINDER: Lazy<NameAndUidFinder> = Lazy::new(|| NameAndUidFinder::new([NAMES], []));

pub struct PsidModule;

static PSID_MODULE: Lazy<Arc<PsidModule>> = Lazy::new(|| Arc::new(PsidModule));

impl PsidModule {
    pub fn get() -> Arc<dyn Module> {
        PSID_MODULE.clone()
    }
}

impl Module for PsidModule {
    fn module_name(&self) -> &'static str {
        "PSID"
    }

    fn module_kind(&self) -> ModuleKind {
        ModuleKind::Feature
    }

    fn find_name(&self, uid: Uid, _sp: Option<Uid>) -> Option<String> {
        FINDER.find_name(uid)
    }

    fn find_uid(&self, name: &str, _sp: Option<Uid>) -> Option<Uid> {
        FINDER.find_uid(name)
    }
}
