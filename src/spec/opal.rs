// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    models::uid::Uid,
    spec::{
        core,
        module::{Module, ModuleKind},
        names::{NameAndUidFinder, NameSequence, SpNameAndUidFinder},
        psid::PsidModule,
        tables::TableDesc,
        types::Type,
    },
};

/// Security providers issued by Opal devices.
pub mod sp {
    use crate::models::uid::Uid;

    pub const ADMIN: Uid = Uid(0x0000_0205_0000_0001);
    pub const LOCKING: Uid = Uid(0x0000_0205_0000_0002);
}

/// SSC-specific methods (assigned out of the core reserved block).
pub mod method {
    use crate::models::uid::Uid;

    pub const REVERT: Uid = Uid(0x0000_0006_0000_0202);
    pub const ACTIVATE: Uid = Uid(0x0000_0006_0000_0203);
    pub const REVERT_SP: Uid = Uid(0x0000_0006_0000_0803);
}

pub mod table {
    use crate::models::uid::Uid;

    pub const DATA_STORE: Uid = Uid(0x0000_1001_0000_0000);
    pub const DATA_REMOVAL_MECHANISM: Uid = Uid(0x0000_1101_0000_0000);
}

pub mod c_pin {
    use crate::models::uid::Uid;

    pub const SID: Uid = Uid(0x0000_000B_0000_0001);
    pub const MSID: Uid = Uid(0x0000_000B_0000_8402);
    pub const ADMIN1: Uid = Uid(0x0000_000B_0000_0201);
    pub const LOCKING_ADMIN1: Uid = Uid(0x0000_000B_0001_0001);
    pub const USER1: Uid = Uid(0x0000_000B_0003_0001);
}

pub mod locking {
    use crate::models::uid::Uid;

    pub const GLOBAL_RANGE: Uid = Uid(0x0000_0802_0000_0001);
    pub const RANGE1: Uid = Uid(0x0000_0802_0003_0001);
}

pub mod k_aes {
    use crate::models::uid::Uid;

    pub const AES_128_GLOBAL_RANGE: Uid = Uid(0x0000_0805_0000_0001);
    pub const AES_128_RANGE1: Uid = Uid(0x0000_0805_0003_0001);
    pub const AES_256_GLOBAL_RANGE: Uid = Uid(0x0000_0806_0000_0001);
    pub const AES_256_RANGE1: Uid = Uid(0x0000_0806_0003_0001);
}

pub mod auth {
    use crate::models::uid::Uid;

    pub const LOCKING_ADMIN1: Uid = Uid(0x0000_0009_0001_0001);
    pub const ADMIN1: Uid = Uid(0x0000_0009_0000_0201);
    pub const USERS: Uid = Uid(0x0000_0009_0003_0000);
    pub const USER1: Uid = Uid(0x0000_0009_0003_0001);
}

static METHOD_NAMES: &[(Uid, &str)] = &[
    (method::ACTIVATE, "MethodID::Activate"),
    (method::REVERT, "MethodID::Revert"),
    (method::REVERT_SP, "MethodID::RevertSP"),
];

static TABLE_NAMES: &[(Uid, &str)] = &[
    (table::DATA_STORE, "DataStore"),
    (table::DATA_REMOVAL_MECHANISM, "DataRemovalMechanism"),
];

static SP_NAMES: &[(Uid, &str)] = &[
    (sp::ADMIN, "SP::Admin"),
    (sp::LOCKING, "SP::Locking"),
];

static ADMIN_SP_NAMES: &[(Uid, &str)] = &[
    (Uid(0x0000_0002_0000_0001), "SPInfo::Admin"),
    (Uid(0x0000_0003_0000_0001), "SPTemplates::Base"),
    (Uid(0x0000_0003_0000_0002), "SPTemplates::Admin"),
    (Uid(0x0000_0008_0000_0001), "ACE::Anybody"),
    (Uid(0x0000_0008_0000_0002), "ACE::Admin"),
    (Uid(0x0000_0008_0003_0001), "ACE::Set_Enabled"),
    (Uid(0x0000_0008_0000_8C02), "ACE::C_PIN_SID_Get_NOPIN"),
    (Uid(0x0000_0008_0000_8C03), "ACE::C_PIN_SID_Set_PIN"),
    (Uid(0x0000_0008_0000_8C04), "ACE::C_PIN_MSID_Get_PIN"),
    (Uid(0x0000_0008_0003_A001), "ACE::C_PIN_Admins_Set_PIN"),
    (Uid(0x0000_0008_0003_0003), "ACE::TPerInfo_Set_ProgrammaticResetEnable"),
    (Uid(0x0000_0008_0003_0002), "ACE::SP_SID"),
    (
        Uid(0x0000_0008_0005_0001),
        "ACE::DataRemovalMechanism_Set_ActiveDataRemovalMechanism",
    ),
    (core::authority::ANYBODY, "Authority::Anybody"),
    (core::authority::ADMINS, "Authority::Admins"),
    (core::authority::MAKERS, "Authority::Makers"),
    (core::authority::SID, "Authority::SID"),
    (c_pin::SID, "C_PIN::SID"),
    (c_pin::MSID, "C_PIN::MSID"),
    (Uid(0x0000_0204_0000_0001), "Template::Base"),
    (Uid(0x0000_0204_0000_0002), "Template::Admin"),
    (Uid(0x0000_0204_0000_0006), "Template::Locking"),
];

static ADMIN_SP_SEQUENCES: &[NameSequence] = &[
    NameSequence::new(auth::ADMIN1, 1, 32, "Authority::Admin{}"),
    NameSequence::new(c_pin::ADMIN1, 1, 32, "C_PIN::Admin{}"),
];

static LOCKING_SP_NAMES: &[(Uid, &str)] = &[
    (Uid(0x0000_0002_0000_0001), "SPInfo::Locking"),
    (Uid(0x0000_0003_0000_0001), "SPTemplates::Base"),
    (Uid(0x0000_0003_0000_0002), "SPTemplates::Locking"),
    (Uid(0x0000_0008_0000_0001), "ACE::Anybody"),
    (Uid(0x0000_0008_0000_0002), "ACE::Admin"),
    (Uid(0x0000_0008_0000_0003), "ACE::Anybody_Get_CommonName"),
    (Uid(0x0000_0008_0000_0004), "ACE::Admins_Set_CommonName"),
    (Uid(0x0000_0008_0003_8000), "ACE::ACE_Get_All"),
    (Uid(0x0000_0008_0003_8001), "ACE::ACE_Set_BooleanExpression"),
    (Uid(0x0000_0008_0003_9000), "ACE::Authority_Get_All"),
    (Uid(0x0000_0008_0003_9001), "ACE::Authority_Set_Enabled"),
    (Uid(0x0000_0008_0003_A000), "ACE::C_PIN_Admins_Get_All_NOPIN"),
    (Uid(0x0000_0008_0003_A001), "ACE::C_PIN_Admins_Set_PIN"),
    (Uid(0x0000_0008_0003_BFFF), "ACE::K_AES_Mode"),
    (Uid(0x0000_0008_0003_B000), "ACE::K_AES_128_GlobalRange_GenKey"),
    (Uid(0x0000_0008_0003_B800), "ACE::K_AES_256_GlobalRange_GenKey"),
    (
        Uid(0x0000_0008_0003_D000),
        "ACE::Locking_GlobalRange_Get_RangeStartToActiveKey",
    ),
    (Uid(0x0000_0008_0003_E000), "ACE::Locking_GlobalRange_Set_RdLocked"),
    (Uid(0x0000_0008_0003_E800), "ACE::Locking_GlobalRange_Set_WrLocked"),
    (Uid(0x0000_0008_0003_F000), "ACE::Locking_GlblRng_Admins_Set"),
    (Uid(0x0000_0008_0003_F001), "ACE::Locking_Admins_RangeStartToLOR"),
    (Uid(0x0000_0008_0003_F800), "ACE::MBRControl_Admins_Set"),
    (Uid(0x0000_0008_0003_F801), "ACE::MBRControl_Set_DoneToDOR"),
    (Uid(0x0000_0008_0003_FC00), "ACE::DataStore_Get_All"),
    (Uid(0x0000_0008_0003_FC01), "ACE::DataStore_Set_All"),
    (Uid(0x0000_0008_0003_0001), "ACE::Set_Enabled"),
    (Uid(0x0000_0008_0000_8C02), "ACE::C_PIN_SID_Get_NOPIN"),
    (Uid(0x0000_0008_0000_8C03), "ACE::C_PIN_SID_Set_PIN"),
    (Uid(0x0000_0008_0000_8C04), "ACE::C_PIN_MSID_Get_PIN"),
    (Uid(0x0000_0008_0003_0003), "ACE::TPerInfo_Set_ProgrammaticResetEnable"),
    (Uid(0x0000_0008_0003_0002), "ACE::SP_SID"),
    (
        Uid(0x0000_0008_0005_0001),
        "ACE::DataRemovalMechanism_Set_ActiveDataRemovalMechanism",
    ),
    (core::authority::ANYBODY, "Authority::Anybody"),
    (core::authority::ADMINS, "Authority::Admins"),
    (auth::USERS, "Authority::Users"),
    (Uid(0x0000_001D_0000_001D), "SecretProtect::K_AES_128"),
    (Uid(0x0000_001D_0000_001E), "SecretProtect::K_AES_256"),
    (locking::GLOBAL_RANGE, "Locking::GlobalRange"),
    (k_aes::AES_128_GLOBAL_RANGE, "K_AES_128::GlobalRange"),
    (k_aes::AES_256_GLOBAL_RANGE, "K_AES_256::GlobalRange"),
];

static LOCKING_SP_SEQUENCES: &[NameSequence] = &[
    NameSequence::new(Uid(0x0000_0008_0004_4001), 1, 32, "ACE::User{}_Set_CommonName"),
    NameSequence::new(Uid(0x0000_0008_0003_A801), 1, 32, "ACE::C_PIN_User{}_Set_PIN"),
    NameSequence::new(Uid(0x0000_0008_0003_B001), 1, 32, "ACE::K_AES_128_Range{}_GenKey"),
    NameSequence::new(Uid(0x0000_0008_0003_B801), 1, 32, "ACE::K_AES_256_Range{}_GenKey"),
    NameSequence::new(
        Uid(0x0000_0008_0003_D001),
        1,
        32,
        "ACE::Locking_Range{}_Get_RangeStartToActiveKey",
    ),
    NameSequence::new(Uid(0x0000_0008_0003_E001), 1, 32, "ACE::Locking_Range{}_Set_RdLocked"),
    NameSequence::new(Uid(0x0000_0008_0003_E801), 1, 32, "ACE::Locking_Range{}_Set_WrLocked"),
    NameSequence::new(auth::LOCKING_ADMIN1, 1, 32, "Authority::Admin{}"),
    NameSequence::new(auth::USER1, 1, 32, "Authority::User{}"),
    NameSequence::new(c_pin::LOCKING_ADMIN1, 1, 32, "C_PIN::Admin{}"),
    NameSequence::new(c_pin::USER1, 1, 32, "C_PIN::User{}"),
    NameSequence::new(locking::RANGE1, 1, 32, "Locking::Range{}"),
    NameSequence::new(k_aes::AES_128_RANGE1, 1, 32, "K_AES_128::Range{}"),
    NameSequence::new(k_aes::AES_256_RANGE1, 1, 32, "K_AES_256::Range{}"),
];

fn make_finder(
    sp_names: &'static [(Uid, &'static str)],
    sp_sequences: &'static [NameSequence],
) -> NameAndUidFinder {
    let mut finder = NameAndUidFinder::new(
        [METHOD_NAMES, TABLE_NAMES, SP_NAMES, sp_names],
        sp_sequences.iter().copied(),
    );
    for &(uid, name) in TABLE_NAMES {
        finder.insert_owned(uid.descriptor(), format!("Table::{name}"));
    }
    finder
}

static FINDER: Lazy<SpNameAndUidFinder> = Lazy::new(|| {
    SpNameAndUidFinder::new([
        (Uid::NULL, make_finder(&[], &[])),
        (sp::ADMIN, make_finder(ADMIN_SP_NAMES, ADMIN_SP_SEQUENCES)),
        (sp::LOCKING, make_finder(LOCKING_SP_NAMES, LOCKING_SP_SEQUENCES)),
    ])
});

/// Opal v1 and v2 share every preconfigured name; only the module identity
/// differs, keyed by the discovered SSC descriptor.
pub struct OpalModule {
    name: &'static str,
}

static OPAL_V1: Lazy<Arc<OpalModule>> =
    Lazy::new(|| Arc::new(OpalModule { name: "Opal v1" }));
static OPAL_V2: Lazy<Arc<OpalModule>> =
    Lazy::new(|| Arc::new(OpalModule { name: "Opal v2" }));

impl OpalModule {
    pub fn v1() -> Arc<dyn Module> {
        OPAL_V1.clone()
    }

    pub fn v2() -> Arc<dyn Module> {
        OPAL_V2.clone()
    }
}

impl Module for OpalModule {
    fn module_name(&self) -> &'static str {
        self.name
    }

    fn module_kind(&self) -> ModuleKind {
        ModuleKind::Ssc
    }

    fn find_name(&self, uid: Uid, sp: Option<Uid>) -> Option<String> {
        FINDER
            .find_name(uid, sp.unwrap_or(Uid::NULL))
            .or_else(|| FINDER.find_name(uid, Uid::NULL))
    }

    fn find_uid(&self, name: &str, sp: Option<Uid>) -> Option<Uid> {
        FINDER
            .find_uid(name, sp.unwrap_or(Uid::NULL))
            .or_else(|| FINDER.find_uid(name, Uid::NULL))
    }

    fn find_table(&self, table: Uid) -> Option<TableDesc> {
        if table == table::DATA_STORE {
            return Some(TableDesc::byte_table("DataStore"));
        }
        // Opal amends two core tables with extra columns.
        if table == core::table::TPER_INFO {
            let mut desc = core::find_table(table)?;
            desc.columns.push(opal_column(
                "ProgrammaticResetEnable",
                core::type_uid::BOOLEAN,
            ));
            return Some(desc);
        }
        if table == core::table::TABLE {
            let mut desc = core::find_table(table)?;
            desc.columns
                .push(opal_column("MandatoryWriteGranularity", core::type_uid::UINTEGER_4));
            desc.columns.push(opal_column(
                "RecommendedAccessGranularity",
                core::type_uid::UINTEGER_4,
            ));
            return Some(desc);
        }
        None
    }

    fn features(&self) -> Vec<Arc<dyn Module>> {
        vec![PsidModule::get()]
    }
}

fn opal_column(name: &str, ty: Uid) -> crate::spec::tables::ColumnDesc {
    crate::spec::tables::ColumnDesc {
        name: name.to_string(),
        is_unique: false,
        ty: core::find_type(ty).unwrap_or_else(Type::unknown),
    }
}
