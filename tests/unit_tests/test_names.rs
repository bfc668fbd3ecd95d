// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use sed_client_rs::{
    models::uid::Uid,
    spec::{
        core::{self, CoreModule},
        module::{ModuleCollection, ModuleKind},
        opal::{self, OpalModule},
        psid::{self, PsidModule},
        tables::TableKind,
    },
};

#[test]
fn core_names_resolve_both_ways() {
    assert_eq!(
        core::find_name(core::authority::SID).as_deref(),
        Some("Authority::SID")
    );
    assert_eq!(
        core::find_uid("Authority::SID"),
        Some(core::authority::SID)
    );
    assert_eq!(
        core::find_name(core::method::START_SESSION).as_deref(),
        Some("MethodID::StartSession")
    );
    assert_eq!(core::find_name(Uid(0xDEAD_BEEF)), None);
}

#[test]
fn table_descriptor_names_are_derived() {
    let descriptor = core::table::C_PIN.descriptor();
    assert_eq!(core::find_name(descriptor).as_deref(), Some("Table::C_PIN"));
    assert_eq!(core::find_uid("Table::C_PIN"), Some(descriptor));
    assert_eq!(descriptor.descriptor_target(), core::table::C_PIN);
}

#[test]
fn core_tables_have_descriptors() {
    let c_pin = core::find_table(core::table::C_PIN).expect("C_PIN table missing");
    assert_eq!(c_pin.kind, TableKind::Object);
    assert_eq!(c_pin.columns[3].name, "PIN");

    let mbr = core::find_table(core::table::MBR).expect("MBR table missing");
    assert_eq!(mbr.kind, TableKind::Byte);
    assert!(mbr.columns.is_empty());

    let locking_info =
        core::find_table(core::table::LOCKING_INFO).expect("LockingInfo table missing");
    assert_eq!(locking_info.single_row, Some(core::single_row::LOCKING_INFO));
}

#[test]
fn opal_scopes_names_by_security_provider() {
    let module = OpalModule::v2();

    assert_eq!(
        module.find_name(opal::auth::USER1, Some(opal::sp::LOCKING)).as_deref(),
        Some("Authority::User1")
    );
    assert_eq!(
        module.find_uid("Authority::User5", Some(opal::sp::LOCKING)),
        Some(Uid(0x0000_0009_0003_0005))
    );
    // The Admin SP has no User authorities.
    assert_eq!(module.find_name(opal::auth::USER1, Some(opal::sp::ADMIN)), None);
    assert_eq!(
        module.find_uid("C_PIN::Admin1", Some(opal::sp::ADMIN)),
        Some(opal::c_pin::ADMIN1)
    );

    // SP names resolve without an SP scope.
    assert_eq!(module.find_name(opal::sp::LOCKING, None).as_deref(), Some("SP::Locking"));
    assert_eq!(
        module.find_name(opal::method::ACTIVATE, None).as_deref(),
        Some("MethodID::Activate")
    );
}

#[test]
fn opal_amends_core_tables() {
    let module = OpalModule::v2();
    let tper_info = module
        .find_table(core::table::TPER_INFO)
        .expect("TPerInfo amendment missing");
    assert!(
        tper_info
            .columns
            .iter()
            .any(|column| column.name == "ProgrammaticResetEnable")
    );
    // The plain core descriptor does not know the Opal column.
    let core_tper_info =
        core::find_table(core::table::TPER_INFO).expect("TPerInfo missing");
    assert!(
        core_tper_info
            .columns
            .iter()
            .all(|column| column.name != "ProgrammaticResetEnable")
    );
}

#[test]
fn psid_module_names() {
    let module = PsidModule::get();
    assert_eq!(
        module.find_name(psid::AUTHORITY_PSID, None).as_deref(),
        Some("Authority::PSID")
    );
    assert_eq!(module.find_uid("C_PIN::PSID", None), Some(psid::C_PIN_PSID));
}

#[test]
fn collection_orders_features_before_ssc_before_core() {
    let mut modules = ModuleCollection::new();
    modules.load(CoreModule::get());
    // Loading Opal pulls in its PSID feature automatically.
    modules.load(OpalModule::v2());
    // Loading twice must not duplicate.
    modules.load(OpalModule::v2());

    let kinds: Vec<ModuleKind> = modules.iter().map(|m| m.module_kind()).collect();
    assert_eq!(kinds, vec![ModuleKind::Feature, ModuleKind::Ssc, ModuleKind::Core]);

    let names: Vec<&str> = modules.iter().map(|m| m.module_name()).collect();
    assert_eq!(names, vec!["PSID", "Opal v2", "Core"]);

    // Feature lookup wins over core fallback, core still answers.
    assert_eq!(
        modules.find_name(psid::AUTHORITY_PSID, None).as_deref(),
        Some("Authority::PSID")
    );
    assert_eq!(
        modules.find_name(core::authority::SID, None).as_deref(),
        Some("Authority::SID")
    );
    assert_eq!(
        modules.name_or_uid(Uid(0x1234), None),
        "0x0000000000001234"
    );
}
