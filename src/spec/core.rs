// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::HashMap, sync::Arc};

use once_cell::sync::Lazy;

use crate::{
    models::uid::Uid,
    spec::{
        module::{Module, ModuleKind},
        names::NameAndUidFinder,
        tables::{ColumnDesc, TableDesc},
        types::Type,
    },
};

/// Tables preconfigured by the core specification.
pub mod table {
    use crate::models::uid::Uid;

    // Base template
    pub const TABLE: Uid = Uid(0x0000_0001_0000_0000);
    pub const SP_INFO: Uid = Uid(0x0000_0002_0000_0000);
    pub const SP_TEMPLATES: Uid = Uid(0x0000_0003_0000_0000);
    pub const COLUMN: Uid = Uid(0x0000_0004_0000_0000);
    pub const TYPE: Uid = Uid(0x0000_0005_0000_0000);
    pub const METHOD_ID: Uid = Uid(0x0000_0006_0000_0000);
    pub const ACCESS_CONTROL: Uid = Uid(0x0000_0007_0000_0000);
    pub const ACE: Uid = Uid(0x0000_0008_0000_0000);
    pub const AUTHORITY: Uid = Uid(0x0000_0009_0000_0000);
    pub const CERTIFICATES: Uid = Uid(0x0000_000A_0000_0000);
    pub const C_PIN: Uid = Uid(0x0000_000B_0000_0000);
    pub const C_RSA_1024: Uid = Uid(0x0000_000C_0000_0000);
    pub const C_RSA_2048: Uid = Uid(0x0000_000D_0000_0000);
    pub const C_AES_128: Uid = Uid(0x0000_000E_0000_0000);
    pub const C_AES_256: Uid = Uid(0x0000_000F_0000_0000);
    pub const C_EC_160: Uid = Uid(0x0000_0010_0000_0000);
    pub const C_EC_192: Uid = Uid(0x0000_0011_0000_0000);
    pub const C_EC_224: Uid = Uid(0x0000_0012_0000_0000);
    pub const C_EC_256: Uid = Uid(0x0000_0013_0000_0000);
    pub const C_EC_384: Uid = Uid(0x0000_0014_0000_0000);
    pub const C_EC_521: Uid = Uid(0x0000_0015_0000_0000);
    pub const C_EC_163: Uid = Uid(0x0000_0016_0000_0000);
    pub const C_EC_233: Uid = Uid(0x0000_0017_0000_0000);
    pub const C_EC_283: Uid = Uid(0x0000_0018_0000_0000);
    pub const C_HMAC_160: Uid = Uid(0x0000_0019_0000_0000);
    pub const C_HMAC_256: Uid = Uid(0x0000_001A_0000_0000);
    pub const C_HMAC_384: Uid = Uid(0x0000_001B_0000_0000);
    pub const C_HMAC_512: Uid = Uid(0x0000_001C_0000_0000);
    pub const SECRET_PROTECT: Uid = Uid(0x0000_001D_0000_0000);
    // Admin template
    pub const TPER_INFO: Uid = Uid(0x0000_0201_0000_0000);
    pub const CRYPTO_SUITE: Uid = Uid(0x0000_0203_0000_0000);
    pub const TEMPLATE: Uid = Uid(0x0000_0204_0000_0000);
    pub const SP: Uid = Uid(0x0000_0205_0000_0000);
    // Clock template
    pub const CLOCK_TIME: Uid = Uid(0x0000_0401_0000_0000);
    // Crypto template
    pub const H_SHA_1: Uid = Uid(0x0000_0601_0000_0000);
    pub const H_SHA_256: Uid = Uid(0x0000_0602_0000_0000);
    pub const H_SHA_384: Uid = Uid(0x0000_0603_0000_0000);
    pub const H_SHA_512: Uid = Uid(0x0000_0604_0000_0000);
    // Log template
    pub const LOG: Uid = Uid(0x0000_0A01_0000_0000);
    pub const LOG_LIST: Uid = Uid(0x0000_0A02_0000_0000);
    // Locking template
    pub const LOCKING_INFO: Uid = Uid(0x0000_0801_0000_0000);
    pub const LOCKING: Uid = Uid(0x0000_0802_0000_0000);
    pub const MBR_CONTROL: Uid = Uid(0x0000_0803_0000_0000);
    pub const MBR: Uid = Uid(0x0000_0804_0000_0000);
    pub const K_AES_128: Uid = Uid(0x0000_0805_0000_0000);
    pub const K_AES_256: Uid = Uid(0x0000_0806_0000_0000);
}

/// The single row of tables that only ever have one.
pub mod single_row {
    use crate::models::uid::Uid;

    pub const SP_INFO: Uid = Uid(0x0000_0002_0000_0001);
    pub const TPER_INFO: Uid = Uid(0x0000_0201_0000_0001);
    pub const LOCKING_INFO: Uid = Uid(0x0000_0801_0000_0001);
    pub const MBR_CONTROL: Uid = Uid(0x0000_0803_0000_0001);
}

/// Methods of the session manager layer and the core templates.
pub mod method {
    use crate::models::uid::Uid;

    // Session manager
    pub const PROPERTIES: Uid = Uid(0x0000_0000_0000_FF01);
    pub const START_SESSION: Uid = Uid(0x0000_0000_0000_FF02);
    pub const SYNC_SESSION: Uid = Uid(0x0000_0000_0000_FF03);
    pub const START_TRUSTED_SESSION: Uid = Uid(0x0000_0000_0000_FF04);
    pub const SYNC_TRUSTED_SESSION: Uid = Uid(0x0000_0000_0000_FF05);
    pub const CLOSE_SESSION: Uid = Uid(0x0000_0000_0000_FF06);

    // Base template
    pub const DELETE_SP: Uid = Uid(0x0000_0006_0000_0001);
    pub const CREATE_TABLE: Uid = Uid(0x0000_0006_0000_0002);
    pub const DELETE: Uid = Uid(0x0000_0006_0000_0003);
    pub const CREATE_ROW: Uid = Uid(0x0000_0006_0000_0004);
    pub const DELETE_ROW: Uid = Uid(0x0000_0006_0000_0005);
    pub const NEXT: Uid = Uid(0x0000_0006_0000_0008);
    pub const GET_FREE_SPACE: Uid = Uid(0x0000_0006_0000_0009);
    pub const GET_FREE_ROWS: Uid = Uid(0x0000_0006_0000_000A);
    pub const DELETE_METHOD: Uid = Uid(0x0000_0006_0000_000B);
    pub const GET_ACL: Uid = Uid(0x0000_0006_0000_000D);
    pub const ADD_ACE: Uid = Uid(0x0000_0006_0000_000E);
    pub const REMOVE_ACE: Uid = Uid(0x0000_0006_0000_000F);
    pub const GEN_KEY: Uid = Uid(0x0000_0006_0000_0010);
    pub const GET_PACKAGE: Uid = Uid(0x0000_0006_0000_0012);
    pub const SET_PACKAGE: Uid = Uid(0x0000_0006_0000_0013);
    pub const GET: Uid = Uid(0x0000_0006_0000_0016);
    pub const SET: Uid = Uid(0x0000_0006_0000_0017);
    pub const AUTHENTICATE: Uid = Uid(0x0000_0006_0000_001C);
    pub const OBSOLETE_0: Uid = Uid(0x0000_0006_0000_0006);
    pub const OBSOLETE_1: Uid = Uid(0x0000_0006_0000_0007);
    pub const OBSOLETE_2: Uid = Uid(0x0000_0006_0000_000C);

    // Admin template
    pub const ISSUE_SP: Uid = Uid(0x0000_0006_0000_0201);

    // Clock template
    pub const GET_CLOCK: Uid = Uid(0x0000_0006_0000_0401);
    pub const RESET_CLOCK: Uid = Uid(0x0000_0006_0000_0402);
    pub const SET_CLOCK_HIGH: Uid = Uid(0x0000_0006_0000_0403);
    pub const SET_LAG_HIGH: Uid = Uid(0x0000_0006_0000_0404);
    pub const SET_CLOCK_LOW: Uid = Uid(0x0000_0006_0000_0405);
    pub const SET_LAG_LOW: Uid = Uid(0x0000_0006_0000_0406);
    pub const INCREMENT_COUNTER: Uid = Uid(0x0000_0006_0000_0407);

    // Crypto template
    pub const RANDOM: Uid = Uid(0x0000_0006_0000_0601);
    pub const SALT: Uid = Uid(0x0000_0006_0000_0602);
    pub const DECRYPT_INIT: Uid = Uid(0x0000_0006_0000_0603);
    pub const DECRYPT: Uid = Uid(0x0000_0006_0000_0604);
    pub const DECRYPT_FINALIZE: Uid = Uid(0x0000_0006_0000_0605);
    pub const ENCRYPT_INIT: Uid = Uid(0x0000_0006_0000_0606);
    pub const ENCRYPT: Uid = Uid(0x0000_0006_0000_0607);
    pub const ENCRYPT_FINALIZE: Uid = Uid(0x0000_0006_0000_0608);
    pub const HMAC_INIT: Uid = Uid(0x0000_0006_0000_0609);
    pub const HMAC: Uid = Uid(0x0000_0006_0000_060A);
    pub const HMAC_FINALIZE: Uid = Uid(0x0000_0006_0000_060B);
    pub const HASH_INIT: Uid = Uid(0x0000_0006_0000_060C);
    pub const HASH: Uid = Uid(0x0000_0006_0000_060D);
    pub const HASH_FINALIZE: Uid = Uid(0x0000_0006_0000_060E);
    pub const SIGN: Uid = Uid(0x0000_0006_0000_060F);
    pub const VERIFY: Uid = Uid(0x0000_0006_0000_0610);
    pub const XOR: Uid = Uid(0x0000_0006_0000_0611);

    // Log template
    pub const ADD_LOG: Uid = Uid(0x0000_0006_0000_0A01);
    pub const CREATE_LOG: Uid = Uid(0x0000_0006_0000_0A02);
    pub const CLEAR_LOG: Uid = Uid(0x0000_0006_0000_0A03);
    pub const FLUSH_LOG: Uid = Uid(0x0000_0006_0000_0A04);

    // Reserved for SSCs
    pub const RESERVED_0: Uid = Uid(0x0000_0006_0000_0011);
    pub const RESERVED_1: Uid = Uid(0x0000_0006_0000_0202);
    pub const RESERVED_2: Uid = Uid(0x0000_0006_0000_0203);
    pub const RESERVED_3: Uid = Uid(0x0000_0006_0000_0803);
}

/// Authorities preconfigured by the Base and Admin templates.
pub mod authority {
    use crate::models::uid::Uid;

    pub const ANYBODY: Uid = Uid(0x0000_0009_0000_0001);
    pub const ADMINS: Uid = Uid(0x0000_0009_0000_0002);
    pub const MAKERS: Uid = Uid(0x0000_0009_0000_0003);
    pub const MAKER_SYM_K: Uid = Uid(0x0000_0009_0000_0004);
    pub const MAKER_PU_K: Uid = Uid(0x0000_0009_0000_0005);
    pub const SID: Uid = Uid(0x0000_0009_0000_0006);
    pub const TPER_SIGN: Uid = Uid(0x0000_0009_0000_0007);
    pub const TPER_EXCH: Uid = Uid(0x0000_0009_0000_0008);
    pub const ADMIN_EXCH: Uid = Uid(0x0000_0009_0000_0009);
    pub const ISSUERS: Uid = Uid(0x0000_0009_0000_0201);
    pub const EDITORS: Uid = Uid(0x0000_0009_0000_0202);
    pub const DELETERS: Uid = Uid(0x0000_0009_0000_0203);
    pub const SERVERS: Uid = Uid(0x0000_0009_0000_0204);
    pub const RESERVE_0: Uid = Uid(0x0000_0009_0000_0205);
    pub const RESERVE_1: Uid = Uid(0x0000_0009_0000_0206);
    pub const RESERVE_2: Uid = Uid(0x0000_0009_0000_0207);
    pub const RESERVE_3: Uid = Uid(0x0000_0009_0000_0208);
}

/// Rows of the Type table the core specification preconfigures.
pub mod type_uid {
    use crate::models::uid::Uid;

    pub const UNKNOWN_TYPE: Uid = Uid(0x0000_0005_FFFF_FFFF);
    pub const BOOLEAN: Uid = Uid(0x0000_0005_0000_0401);
    pub const INTEGER_1: Uid = Uid(0x0000_0005_0000_0210);
    pub const INTEGER_2: Uid = Uid(0x0000_0005_0000_0213);
    pub const UINTEGER_1: Uid = Uid(0x0000_0005_0000_0211);
    pub const UINTEGER_2: Uid = Uid(0x0000_0005_0000_0215);
    pub const UINTEGER_4: Uid = Uid(0x0000_0005_0000_0220);
    pub const UINTEGER_8: Uid = Uid(0x0000_0005_0000_0225);
    pub const MAX_BYTES_32: Uid = Uid(0x0000_0005_0000_020D);
    pub const MAX_BYTES_64: Uid = Uid(0x0000_0005_0000_020E);
    pub const BYTES_4: Uid = Uid(0x0000_0005_0000_0238);
    pub const BYTES_12: Uid = Uid(0x0000_0005_0000_0201);
    pub const BYTES_16: Uid = Uid(0x0000_0005_0000_0202);
    pub const BYTES_32: Uid = Uid(0x0000_0005_0000_0205);
    pub const BYTES_64: Uid = Uid(0x0000_0005_0000_0206);
    pub const KEY_128: Uid = Uid(0x0000_0005_0000_0602);
    pub const KEY_256: Uid = Uid(0x0000_0005_0000_0603);
    pub const TYPE_DEF: Uid = Uid(0x0000_0005_0000_0203);
    pub const NAME: Uid = Uid(0x0000_0005_0000_020B);
    pub const PASSWORD: Uid = Uid(0x0000_0005_0000_020C);
    pub const YEAR_ENUM: Uid = Uid(0x0000_0005_0000_0416);
    pub const MONTH_ENUM: Uid = Uid(0x0000_0005_0000_0417);
    pub const DAY_ENUM: Uid = Uid(0x0000_0005_0000_0418);
    pub const YEAR: Uid = Uid(0x0000_0005_0000_1401);
    pub const MONTH: Uid = Uid(0x0000_0005_0000_1402);
    pub const DAY: Uid = Uid(0x0000_0005_0000_1403);
    pub const DATE: Uid = Uid(0x0000_0005_0000_1804);
    pub const MESSAGING_TYPE: Uid = Uid(0x0000_0005_0000_0404);
    pub const HASH_PROTOCOL: Uid = Uid(0x0000_0005_0000_040D);
    pub const AUTH_METHOD: Uid = Uid(0x0000_0005_0000_0408);
    pub const LOG_SELECT: Uid = Uid(0x0000_0005_0000_040C);
    pub const PROTECT_TYPES: Uid = Uid(0x0000_0005_0000_1A05);
    pub const REENCRYPT_REQUEST: Uid = Uid(0x0000_0005_0000_0413);
    pub const REENCRYPT_STATE: Uid = Uid(0x0000_0005_0000_0414);
    pub const RESET_TYPES: Uid = Uid(0x0000_0005_0000_1A01);
    pub const ADV_KEY_MODE: Uid = Uid(0x0000_0005_0000_040F);
    pub const VERIFY_MODE: Uid = Uid(0x0000_0005_0000_0412);
    pub const LAST_REENC_STAT: Uid = Uid(0x0000_0005_0000_0411);
    pub const GEN_STATUS: Uid = Uid(0x0000_0005_0000_1A02);
    pub const ENC_SUPPORTED: Uid = Uid(0x0000_0005_0000_041D);
    pub const KEYS_AVAIL_CONDS: Uid = Uid(0x0000_0005_0000_0410);
    pub const SYMMETRIC_MODE_MEDIA: Uid = Uid(0x0000_0005_0000_0403);
    pub const UID: Uid = Uid(0x0000_0005_0000_0209);
    pub const TABLE_KIND: Uid = Uid(0x0000_0005_0000_0415);
    pub const OBJECT_REF: Uid = Uid(0x0000_0005_0000_0F02);
    pub const TABLE_REF: Uid = Uid(0x0000_0005_0000_0F03);
    pub const BYTE_TABLE_REF: Uid = Uid(0x0000_0005_0000_1001);
    pub const TABLE_OR_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0606);
    pub const AUTHORITY_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C05);
    pub const TABLE_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C09);
    pub const METHOD_ID_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C03);
    pub const SP_TEMPLATES_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C01);
    pub const COLUMN_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C07);
    pub const TEMPLATE_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C08);
    pub const LOG_LIST_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C0D);
    pub const CRED_OBJECT_UIDREF: Uid = Uid(0x0000_0005_0000_0C0B);
    pub const MEDIAKEY_OBJECT_UIDREF: Uid = Uid(0x0000_0005_0000_0C0C);
    pub const BOOLEAN_ACE: Uid = Uid(0x0000_0005_0000_040E);
    pub const ACE_EXPRESSION: Uid = Uid(0x0000_0005_0000_0601);
    pub const AC_ELEMENT: Uid = Uid(0x0000_0005_0000_0801);
    pub const ACE_OBJECT_REF: Uid = Uid(0x0000_0005_0000_0C04);
    pub const ACL: Uid = Uid(0x0000_0005_0000_0802);
    pub const ACE_COLUMNS: Uid = Uid(0x0000_0005_0000_1A03);
    pub const LIFE_CYCLE_STATE: Uid = Uid(0x0000_0005_0000_0405);
    pub const SSC: Uid = Uid(0x0000_0005_0000_0803);
}

static TABLE_NAMES: &[(Uid, &str)] = &[
    (table::TABLE, "Table"),
    (table::SP_INFO, "SPInfo"),
    (table::SP_TEMPLATES, "SPTemplates"),
    (table::COLUMN, "Column"),
    (table::TYPE, "Type"),
    (table::METHOD_ID, "MethodID"),
    (table::ACCESS_CONTROL, "AccessControl"),
    (table::ACE, "ACE"),
    (table::AUTHORITY, "Authority"),
    (table::CERTIFICATES, "Certificates"),
    (table::C_PIN, "C_PIN"),
    (table::C_RSA_1024, "C_RSA_1024"),
    (table::C_RSA_2048, "C_RSA_2048"),
    (table::C_AES_128, "C_AES_128"),
    (table::C_AES_256, "C_AES_256"),
    (table::C_EC_160, "C_EC_160"),
    (table::C_EC_192, "C_EC_192"),
    (table::C_EC_224, "C_EC_224"),
    (table::C_EC_256, "C_EC_256"),
    (table::C_EC_384, "C_EC_384"),
    (table::C_EC_521, "C_EC_521"),
    (table::C_EC_163, "C_EC_163"),
    (table::C_EC_233, "C_EC_233"),
    (table::C_EC_283, "C_EC_283"),
    (table::C_HMAC_160, "C_HMAC_160"),
    (table::C_HMAC_256, "C_HMAC_256"),
    (table::C_HMAC_384, "C_HMAC_384"),
    (table::C_HMAC_512, "C_HMAC_512"),
    (table::SECRET_PROTECT, "SecretProtect"),
    (table::TPER_INFO, "TPerInfo"),
    (table::CRYPTO_SUITE, "CryptoSuite"),
    (table::TEMPLATE, "Template"),
    (table::SP, "SP"),
    (table::CLOCK_TIME, "ClockTime"),
    (table::H_SHA_1, "H_SHA_1"),
    (table::H_SHA_256, "H_SHA_256"),
    (table::H_SHA_384, "H_SHA_384"),
    (table::H_SHA_512, "H_SHA_512"),
    (table::LOG, "Log"),
    (table::LOG_LIST, "LogList"),
    (table::LOCKING_INFO, "LockingInfo"),
    (table::LOCKING, "Locking"),
    (table::MBR_CONTROL, "MBRControl"),
    (table::MBR, "MBR"),
    (table::K_AES_128, "K_AES_128"),
    (table::K_AES_256, "K_AES_256"),
];

static SINGLE_ROW_NAMES: &[(Uid, &str)] = &[
    (single_row::SP_INFO, "SPInfo::SPInfo"),
    (single_row::TPER_INFO, "TPerInfo::TPerInfo"),
    (single_row::LOCKING_INFO, "LockingInfo::LockingInfo"),
    (single_row::MBR_CONTROL, "MBRControl::MBRControl"),
];

static METHOD_NAMES: &[(Uid, &str)] = &[
    (method::PROPERTIES, "MethodID::Properties"),
    (method::START_SESSION, "MethodID::StartSession"),
    (method::SYNC_SESSION, "MethodID::SyncSession"),
    (method::START_TRUSTED_SESSION, "MethodID::StartTrustedSession"),
    (method::SYNC_TRUSTED_SESSION, "MethodID::SyncTrustedSession"),
    (method::CLOSE_SESSION, "MethodID::CloseSession"),
    (method::DELETE_SP, "MethodID::DeleteSP"),
    (method::CREATE_TABLE, "MethodID::CreateTable"),
    (method::DELETE, "MethodID::Delete"),
    (method::CREATE_ROW, "MethodID::CreateRow"),
    (method::DELETE_ROW, "MethodID::DeleteRow"),
    (method::NEXT, "MethodID::Next"),
    (method::GET_FREE_SPACE, "MethodID::GetFreeSpace"),
    (method::GET_FREE_ROWS, "MethodID::GetFreeRows"),
    (method::DELETE_METHOD, "MethodID::DeleteMethod"),
    (method::GET_ACL, "MethodID::GetACL"),
    (method::ADD_ACE, "MethodID::AddACE"),
    (method::REMOVE_ACE, "MethodID::RemoveACE"),
    (method::GEN_KEY, "MethodID::GenKey"),
    (method::GET_PACKAGE, "MethodID::GetPackage"),
    (method::SET_PACKAGE, "MethodID::SetPackage"),
    (method::GET, "MethodID::Get"),
    (method::SET, "MethodID::Set"),
    (method::AUTHENTICATE, "MethodID::Authenticate"),
    (method::OBSOLETE_0, "MethodID::Obsolete_0"),
    (method::OBSOLETE_1, "MethodID::Obsolete_1"),
    (method::OBSOLETE_2, "MethodID::Obsolete_2"),
    (method::ISSUE_SP, "MethodID::IssueSP"),
    (method::GET_CLOCK, "MethodID::GetClock"),
    (method::RESET_CLOCK, "MethodID::ResetClock"),
    (method::SET_CLOCK_HIGH, "MethodID::SetClockHigh"),
    (method::SET_LAG_HIGH, "MethodID::SetLagHigh"),
    (method::SET_CLOCK_LOW, "MethodID::SetClockLow"),
    (method::SET_LAG_LOW, "MethodID::SetLagLow"),
    (method::INCREMENT_COUNTER, "MethodID::IncrementCounter"),
    (method::RANDOM, "MethodID::Random"),
    (method::SALT, "MethodID::Salt"),
    (method::DECRYPT_INIT, "MethodID::DecryptInit"),
    (method::DECRYPT, "MethodID::Decrypt"),
    (method::DECRYPT_FINALIZE, "MethodID::DecryptFinalize"),
    (method::ENCRYPT_INIT, "MethodID::EncryptInit"),
    (method::ENCRYPT, "MethodID::Encrypt"),
    (method::ENCRYPT_FINALIZE, "MethodID::EncryptFinalize"),
    (method::HMAC_INIT, "MethodID::HMACInit"),
    (method::HMAC, "MethodID::HMAC"),
    (method::HMAC_FINALIZE, "MethodID::HMACFinalize"),
    (method::HASH_INIT, "MethodID::HashInit"),
    (method::HASH, "MethodID::Hash"),
    (method::HASH_FINALIZE, "MethodID::HashFinalize"),
    (method::SIGN, "MethodID::Sign"),
    (method::VERIFY, "MethodID::Verify"),
    (method::XOR, "MethodID::XOR"),
    (method::ADD_LOG, "MethodID::AddLog"),
    (method::CREATE_LOG, "MethodID::CreateLog"),
    (method::CLEAR_LOG, "MethodID::ClearLog"),
    (method::FLUSH_LOG, "MethodID::FlushLog"),
    (method::RESERVED_0, "MethodID::Reserved_0"),
    (method::RESERVED_1, "MethodID::Reserved_1"),
    (method::RESERVED_2, "MethodID::Reserved_2"),
    (method::RESERVED_3, "MethodID::Reserved_3"),
];

static AUTHORITY_NAMES: &[(Uid, &str)] = &[
    (authority::ANYBODY, "Authority::Anybody"),
    (authority::ADMINS, "Authority::Admins"),
    (authority::MAKERS, "Authority::Makers"),
    (authority::MAKER_SYM_K, "Authority::MakerSymK"),
    (authority::MAKER_PU_K, "Authority::MakerPuK"),
    (authority::SID, "Authority::SID"),
    (authority::TPER_SIGN, "Authority::TPerSign"),
    (authority::TPER_EXCH, "Authority::TPerExch"),
    (authority::ADMIN_EXCH, "Authority::AdminExch"),
    (authority::ISSUERS, "Authority::Issuers"),
    (authority::EDITORS, "Authority::Editors"),
    (authority::DELETERS, "Authority::Deleters"),
    (authority::SERVERS, "Authority::Servers"),
    (authority::RESERVE_0, "Authority::Reserve0"),
    (authority::RESERVE_1, "Authority::Reserve1"),
    (authority::RESERVE_2, "Authority::Reserve2"),
    (authority::RESERVE_3, "Authority::Reserve3"),
];

static FINDER: Lazy<NameAndUidFinder> = Lazy::new(|| {
    let mut finder = NameAndUidFinder::new(
        [TABLE_NAMES, SINGLE_ROW_NAMES, METHOD_NAMES, AUTHORITY_NAMES],
        [],
    );
    // Rows of the Table table describing each preconfigured table.
    for &(uid, name) in TABLE_NAMES {
        finder.insert_owned(uid.descriptor(), format!("Table::{name}"));
    }
    finder
});

pub fn find_name(uid: Uid) -> Option<String> {
    FINDER.find_name(uid)
}

pub fn find_uid(name: &str) -> Option<Uid> {
    FINDER.find_uid(name)
}

//------------------------------------------------------------------------------
// Type definitions
//------------------------------------------------------------------------------

static TYPE_DEFS: Lazy<HashMap<Uid, Type>> = Lazy::new(|| {
    use type_uid as t;

    let unknown_type = Type::unknown().identified(t::UNKNOWN_TYPE);
    let boolean = Type::enumeration(0, 1).identified(t::BOOLEAN);

    let integer_1 = Type::signed(1).identified(t::INTEGER_1);
    let integer_2 = Type::signed(2).identified(t::INTEGER_2);
    let uinteger_1 = Type::unsigned(1).identified(t::UINTEGER_1);
    let uinteger_2 = Type::unsigned(2).identified(t::UINTEGER_2);
    let uinteger_4 = Type::unsigned(4).identified(t::UINTEGER_4);
    let uinteger_8 = Type::unsigned(8).identified(t::UINTEGER_8);

    let max_bytes_32 = Type::capped_bytes(32).identified(t::MAX_BYTES_32);
    let max_bytes_64 = Type::capped_bytes(64).identified(t::MAX_BYTES_64);
    let bytes_4 = Type::fixed_bytes(4).identified(t::BYTES_4);
    let bytes_12 = Type::fixed_bytes(12).identified(t::BYTES_12);
    let bytes_16 = Type::fixed_bytes(16).identified(t::BYTES_16);
    let bytes_32 = Type::fixed_bytes(32).identified(t::BYTES_32);
    let bytes_64 = Type::fixed_bytes(64).identified(t::BYTES_64);

    let key_128 = Type::alternative(vec![bytes_16.clone(), bytes_32.clone()])
        .identified(t::KEY_128);
    let key_256 = Type::alternative(vec![bytes_32.clone(), bytes_64.clone()])
        .identified(t::KEY_256);

    let type_def = Type::capped_bytes(65536).identified(t::TYPE_DEF);
    let name = Type::capped_bytes(32).identified(t::NAME);
    let password = Type::capped_bytes(32).identified(t::PASSWORD);
    let year_enum = Type::enumeration(1970, 9999).identified(t::YEAR_ENUM);
    let month_enum = Type::enumeration(1, 12).identified(t::MONTH_ENUM);
    let day_enum = Type::enumeration(1, 31).identified(t::DAY_ENUM);
    let year = Type::name_value(0, year_enum.clone()).identified(t::YEAR);
    let month = Type::name_value(1, month_enum.clone()).identified(t::MONTH);
    let day = Type::name_value(2, day_enum.clone()).identified(t::DAY);
    let date =
        Type::struct_of(vec![year.clone(), month.clone(), day.clone()]).identified(t::DATE);

    let messaging_type = Type::enumeration(0, 255).identified(t::MESSAGING_TYPE);
    let hash_protocol = Type::enumeration(0, 15).identified(t::HASH_PROTOCOL);
    let auth_method = Type::enumeration(0, 23).identified(t::AUTH_METHOD);
    let log_select = Type::enumeration(0, 3).identified(t::LOG_SELECT);
    let protect_types = Type::set(0, 255).identified(t::PROTECT_TYPES);
    let reencrypt_request = Type::enumeration(1, 16).identified(t::REENCRYPT_REQUEST);
    let reencrypt_state = Type::enumeration(1, 16).identified(t::REENCRYPT_STATE);
    let reset_types = Type::set(1, 31).identified(t::RESET_TYPES);
    let adv_key_mode = Type::enumeration(0, 7).identified(t::ADV_KEY_MODE);
    let verify_mode = Type::enumeration(0, 7).identified(t::VERIFY_MODE);
    let last_reenc_stat = Type::enumeration(0, 7).identified(t::LAST_REENC_STAT);
    let gen_status = Type::set(0, 63).identified(t::GEN_STATUS);
    let enc_supported = Type::enumeration(0, 15).identified(t::ENC_SUPPORTED);
    let keys_avail_conds = Type::enumeration(0, 7).identified(t::KEYS_AVAIL_CONDS);
    let symmetric_mode_media =
        Type::enumeration(0, 23).identified(t::SYMMETRIC_MODE_MEDIA);

    let uid = Type::fixed_bytes(8).identified(t::UID);

    let table_kind = Type::enumeration(1, 8).identified(t::TABLE_KIND);
    let object_ref = Type::object_ref().identified(t::OBJECT_REF);
    let table_ref = Type::table_ref().identified(t::TABLE_REF);
    let byte_table_ref = Type::byte_table_ref().identified(t::BYTE_TABLE_REF);
    let table_or_object_ref =
        Type::alternative(vec![object_ref.clone(), table_ref.clone()])
            .identified(t::TABLE_OR_OBJECT_REF);

    let authority_object_ref = Type::restricted_object_ref(vec![table::AUTHORITY])
        .identified(t::AUTHORITY_OBJECT_REF);
    let table_object_ref =
        Type::restricted_object_ref(vec![table::TABLE]).identified(t::TABLE_OBJECT_REF);
    let method_id_object_ref = Type::restricted_object_ref(vec![table::METHOD_ID])
        .identified(t::METHOD_ID_OBJECT_REF);
    let sp_templates_object_ref = Type::restricted_object_ref(vec![table::SP_TEMPLATES])
        .identified(t::SP_TEMPLATES_OBJECT_REF);
    let column_object_ref =
        Type::restricted_object_ref(vec![table::COLUMN]).identified(t::COLUMN_OBJECT_REF);
    let template_object_ref = Type::restricted_object_ref(vec![table::TEMPLATE])
        .identified(t::TEMPLATE_OBJECT_REF);
    let log_list_object_ref = Type::restricted_object_ref(vec![table::LOG_LIST])
        .identified(t::LOG_LIST_OBJECT_REF);
    let cred_object_uidref = Type::restricted_object_ref(vec![
        table::C_PIN,
        table::C_AES_128,
        table::C_AES_256,
        table::C_RSA_1024,
        table::C_RSA_2048,
        table::C_EC_160,
        table::C_EC_192,
        table::C_EC_224,
        table::C_EC_256,
        table::C_EC_384,
        table::C_EC_521,
        table::C_EC_163,
        table::C_EC_233,
        table::C_EC_283,
        table::C_HMAC_160,
        table::C_HMAC_256,
        table::C_HMAC_384,
        table::C_HMAC_512,
    ])
    .identified(t::CRED_OBJECT_UIDREF);
    let mediakey_object_uidref =
        Type::restricted_object_ref(vec![table::K_AES_128, table::K_AES_256])
            .identified(t::MEDIAKEY_OBJECT_UIDREF);

    let boolean_ace =
        Type::enumeration_labeled(0, 2, &[(0, "And"), (1, "Or"), (2, "Not")])
            .identified(t::BOOLEAN_ACE);
    let ace_expression =
        Type::alternative(vec![authority_object_ref.clone(), boolean_ace.clone()])
            .identified(t::ACE_EXPRESSION);
    let ac_element = Type::list(ace_expression.clone()).identified(t::AC_ELEMENT);
    let ace_object_ref =
        Type::restricted_object_ref(vec![table::ACE]).identified(t::ACE_OBJECT_REF);
    let acl = Type::list(ace_object_ref.clone()).identified(t::ACL);
    let ace_columns = Type::set(0, u64::from(u16::MAX)).identified(t::ACE_COLUMNS);

    let life_cycle_state = Type::enumeration(0, 15).identified(t::LIFE_CYCLE_STATE);
    let ssc = Type::list(name.clone()).identified(t::SSC);

    let defs = [
        unknown_type,
        boolean,
        integer_1,
        integer_2,
        uinteger_1,
        uinteger_2,
        uinteger_4,
        uinteger_8,
        max_bytes_32,
        max_bytes_64,
        bytes_4,
        bytes_12,
        bytes_16,
        bytes_32,
        bytes_64,
        key_128,
        key_256,
        type_def,
        name,
        password,
        year_enum,
        month_enum,
        day_enum,
        year,
        month,
        day,
        date,
        messaging_type,
        hash_protocol,
        auth_method,
        log_select,
        protect_types,
        reencrypt_request,
        reencrypt_state,
        reset_types,
        adv_key_mode,
        verify_mode,
        last_reenc_stat,
        gen_status,
        enc_supported,
        keys_avail_conds,
        symmetric_mode_media,
        uid,
        table_kind,
        object_ref,
        table_ref,
        byte_table_ref,
        table_or_object_ref,
        authority_object_ref,
        table_object_ref,
        method_id_object_ref,
        sp_templates_object_ref,
        column_object_ref,
        template_object_ref,
        log_list_object_ref,
        cred_object_uidref,
        mediakey_object_uidref,
        boolean_ace,
        ace_expression,
        ac_element,
        ace_object_ref,
        acl,
        ace_columns,
        life_cycle_state,
        ssc,
    ];

    defs.into_iter()
        .filter_map(|ty| ty.uid().map(|uid| (uid, ty)))
        .collect()
});

pub fn find_type(uid: Uid) -> Option<Type> {
    TYPE_DEFS.get(&uid).cloned()
}

//------------------------------------------------------------------------------
// Table descriptors
//------------------------------------------------------------------------------

fn column(name: &str, is_unique: bool, ty: Uid) -> ColumnDesc {
    ColumnDesc {
        name: name.to_string(),
        is_unique,
        ty: find_type(ty).unwrap_or_else(Type::unknown),
    }
}

static TABLE_DESCS: Lazy<HashMap<Uid, TableDesc>> = Lazy::new(|| {
    use type_uid as t;

    let columns_table = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("TemplateID", true, t::TEMPLATE_OBJECT_REF),
        column("Kind", false, t::TABLE_KIND),
        column("Column", false, t::COLUMN_OBJECT_REF),
        column("NumColumns", false, t::UINTEGER_4),
        column("Rows", false, t::UINTEGER_4),
        column("RowsFree", false, t::UINTEGER_4),
        column("RowBytes", false, t::UINTEGER_4),
        column("LastID", false, t::UID),
        column("MinSize", false, t::UINTEGER_4),
        column("MaxSize", false, t::UINTEGER_4),
    ];

    let columns_sp_info = vec![
        column("UID", false, t::UID),
        column("SPID", false, t::UID),
        column("Name", false, t::NAME),
        column("Size", false, t::UINTEGER_8),
        column("SizeInUse", false, t::UINTEGER_8),
        column("SPSessionTimeout", false, t::UINTEGER_4),
        column("Enabled", false, t::BOOLEAN),
    ];

    let columns_sp_templates = vec![
        column("UID", false, t::UID),
        column("TemplateID", false, t::TEMPLATE_OBJECT_REF),
        column("Name", false, t::NAME),
        column("Version", false, t::BYTES_4),
    ];

    let columns_type = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("Format", false, t::TYPE_DEF),
        column("Size", false, t::UINTEGER_2),
    ];

    let columns_method_id = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("TemplateID", true, t::TEMPLATE_OBJECT_REF),
    ];

    let columns_access_control = vec![
        column("UID", false, t::UID),
        column("InvokingID", true, t::TABLE_OR_OBJECT_REF),
        column("MethodID", true, t::METHOD_ID_OBJECT_REF),
        column("CommonName", false, t::NAME),
        column("ACL", false, t::ACL),
        column("Log", false, t::LOG_SELECT),
        column("AddACEACL", false, t::ACL),
        column("RemoveACEACL", false, t::ACL),
        column("GetACLACL", false, t::ACL),
        column("DeleteMethodACL", false, t::ACL),
        column("AddACELog", false, t::LOG_SELECT),
        column("RemoveACELog", false, t::LOG_SELECT),
        column("GetACLLog", false, t::LOG_SELECT),
        column("DeleteMethodLog", false, t::LOG_SELECT),
        column("LogTo", false, t::LOG_LIST_OBJECT_REF),
    ];

    let columns_ace = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("BooleanExpr", false, t::AC_ELEMENT),
        column("Columns", false, t::ACE_COLUMNS),
    ];

    let columns_authority = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("IsClass", false, t::BOOLEAN),
        column("Class", false, t::AUTHORITY_OBJECT_REF),
        column("Enabled", false, t::BOOLEAN),
        column("Secure", false, t::MESSAGING_TYPE),
        column("HashAndSign", false, t::HASH_PROTOCOL),
        column("PresentCertificate", false, t::BOOLEAN),
        column("Operation", false, t::AUTH_METHOD),
        column("Credential", false, t::CRED_OBJECT_UIDREF),
        column("ResponseSign", false, t::AUTHORITY_OBJECT_REF),
        column("ResponseExch", false, t::AUTHORITY_OBJECT_REF),
        column("ClockStart", false, t::DATE),
        column("ClockEnd", false, t::DATE),
        column("Limit", false, t::UINTEGER_4),
        column("Uses", false, t::UINTEGER_4),
        column("Log", false, t::LOG_SELECT),
        column("LogTo", false, t::LOG_LIST_OBJECT_REF),
    ];

    let columns_c_pin = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("PIN", false, t::PASSWORD),
        column("CharSet", false, t::BYTE_TABLE_REF),
        column("TryLimit", false, t::UINTEGER_4),
        column("Tries", false, t::UINTEGER_4),
        column("Persistence", false, t::BOOLEAN),
    ];

    let columns_secret_protect = vec![
        column("UID", false, t::UID),
        column("Table", false, t::TABLE_OBJECT_REF),
        column("ColumnNumber", false, t::UINTEGER_4),
        column("ProtectMechanisms", false, t::PROTECT_TYPES),
    ];

    let columns_tper_info = vec![
        column("UID", false, t::UID),
        column("Bytes", false, t::UINTEGER_8),
        column("GUDID", false, t::BYTES_12),
        column("Generation", false, t::UINTEGER_4),
        column("FirmwareVersion", false, t::UINTEGER_4),
        column("ProtocolVersion", false, t::UINTEGER_4),
        column("SpaceForIssuance", false, t::UINTEGER_8),
        column("SSC", false, t::SSC),
    ];

    let columns_template = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("RevisionNumber", false, t::UINTEGER_4),
        column("Instances", false, t::UINTEGER_2),
        column("MaxInstances", false, t::UINTEGER_2),
    ];

    let columns_sp = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("ORG", false, t::AUTHORITY_OBJECT_REF),
        column("EffectiveAuth", false, t::MAX_BYTES_32),
        column("DateofIssue", false, t::DATE),
        column("Bytes", false, t::UINTEGER_8),
        column("LifeCycleState", false, t::LIFE_CYCLE_STATE),
        column("Frozen", false, t::BOOLEAN),
    ];

    let columns_locking_info = vec![
        column("UID", false, t::UID),
        column("Name", false, t::NAME),
        column("Version", false, t::UINTEGER_4),
        column("EncryptSupport", false, t::ENC_SUPPORTED),
        column("MaxRanges", false, t::UINTEGER_4),
        column("MaxReEncryptions", false, t::UINTEGER_4),
        column("KeysAvailableCfg", false, t::KEYS_AVAIL_CONDS),
    ];

    let columns_locking = vec![
        column("UID", false, t::UID),
        column("Name", false, t::NAME),
        column("CommonName", false, t::NAME),
        column("RangeStart", false, t::UINTEGER_8),
        column("RangeLength", false, t::UINTEGER_8),
        column("ReadLockEnabled", false, t::BOOLEAN),
        column("WriteLockEnabled", false, t::BOOLEAN),
        column("ReadLocked", false, t::BOOLEAN),
        column("WriteLocked", false, t::BOOLEAN),
        column("LockOnReset", false, t::RESET_TYPES),
        column("ActiveKey", false, t::MEDIAKEY_OBJECT_UIDREF),
        column("NextKey", false, t::MEDIAKEY_OBJECT_UIDREF),
        column("ReEncryptState", false, t::REENCRYPT_STATE),
        column("ReEncryptRequest", false, t::REENCRYPT_REQUEST),
        column("AdvKeyMode", false, t::ADV_KEY_MODE),
        column("VerifyMode", false, t::VERIFY_MODE),
        column("ContOnReset", false, t::RESET_TYPES),
        column("LastReEncryptLBA", false, t::UINTEGER_8),
        column("LastReEncStat", false, t::LAST_REENC_STAT),
        column("GeneralStatus", false, t::GEN_STATUS),
    ];

    let columns_mbr_control = vec![
        column("UID", false, t::UID),
        column("Enable", false, t::BOOLEAN),
        column("Done", false, t::BOOLEAN),
        column("MBRDoneOnReset", false, t::RESET_TYPES),
    ];

    let columns_k_aes_128 = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("Key", false, t::KEY_128),
        column("Mode", false, t::SYMMETRIC_MODE_MEDIA),
    ];

    let columns_k_aes_256 = vec![
        column("UID", false, t::UID),
        column("Name", true, t::NAME),
        column("CommonName", true, t::NAME),
        column("Key", false, t::KEY_256),
        column("Mode", false, t::SYMMETRIC_MODE_MEDIA),
    ];

    let descs = [
        (
            table::TABLE,
            TableDesc::object_table("Table").with_columns(columns_table),
        ),
        (
            table::SP_INFO,
            TableDesc::object_table("SPInfo")
                .with_columns(columns_sp_info)
                .with_single_row(single_row::SP_INFO),
        ),
        (
            table::SP_TEMPLATES,
            TableDesc::object_table("SPTemplates").with_columns(columns_sp_templates),
        ),
        (table::COLUMN, TableDesc::object_table("Column")),
        (
            table::TYPE,
            TableDesc::object_table("Type").with_columns(columns_type),
        ),
        (
            table::METHOD_ID,
            TableDesc::object_table("MethodID").with_columns(columns_method_id),
        ),
        (
            table::ACCESS_CONTROL,
            TableDesc::object_table("AccessControl").with_columns(columns_access_control),
        ),
        (
            table::ACE,
            TableDesc::object_table("ACE").with_columns(columns_ace),
        ),
        (
            table::AUTHORITY,
            TableDesc::object_table("Authority").with_columns(columns_authority),
        ),
        (table::CERTIFICATES, TableDesc::object_table("Certificates")),
        (
            table::C_PIN,
            TableDesc::object_table("C_PIN").with_columns(columns_c_pin),
        ),
        (table::C_RSA_1024, TableDesc::object_table("C_RSA_1024")),
        (table::C_RSA_2048, TableDesc::object_table("C_RSA_2048")),
        (table::C_AES_128, TableDesc::object_table("C_AES_128")),
        (table::C_AES_256, TableDesc::object_table("C_AES_256")),
        (table::C_EC_160, TableDesc::object_table("C_EC_160")),
        (table::C_EC_192, TableDesc::object_table("C_EC_192")),
        (table::C_EC_224, TableDesc::object_table("C_EC_224")),
        (table::C_EC_256, TableDesc::object_table("C_EC_256")),
        (table::C_EC_384, TableDesc::object_table("C_EC_384")),
        (table::C_EC_521, TableDesc::object_table("C_EC_521")),
        (table::C_EC_163, TableDesc::object_table("C_EC_163")),
        (table::C_EC_233, TableDesc::object_table("C_EC_233")),
        (table::C_EC_283, TableDesc::object_table("C_EC_283")),
        (table::C_HMAC_160, TableDesc::object_table("C_HMAC_160")),
        (table::C_HMAC_256, TableDesc::object_table("C_HMAC_256")),
        (table::C_HMAC_384, TableDesc::object_table("C_HMAC_384")),
        (table::C_HMAC_512, TableDesc::object_table("C_HMAC_512")),
        (
            table::SECRET_PROTECT,
            TableDesc::object_table("SecretProtect").with_columns(columns_secret_protect),
        ),
        (
            table::TPER_INFO,
            TableDesc::object_table("TPerInfo")
                .with_columns(columns_tper_info)
                .with_single_row(single_row::TPER_INFO),
        ),
        (table::CRYPTO_SUITE, TableDesc::object_table("CryptoSuite")),
        (
            table::TEMPLATE,
            TableDesc::object_table("Template").with_columns(columns_template),
        ),
        (
            table::SP,
            TableDesc::object_table("SP").with_columns(columns_sp),
        ),
        (table::CLOCK_TIME, TableDesc::object_table("ClockTime")),
        (table::H_SHA_1, TableDesc::object_table("H_SHA_1")),
        (table::H_SHA_256, TableDesc::object_table("H_SHA_256")),
        (table::H_SHA_384, TableDesc::object_table("H_SHA_384")),
        (table::H_SHA_512, TableDesc::object_table("H_SHA_512")),
        (table::LOG, TableDesc::object_table("Log")),
        (table::LOG_LIST, TableDesc::object_table("LogList")),
        (
            table::LOCKING_INFO,
            TableDesc::object_table("LockingInfo")
                .with_columns(columns_locking_info)
                .with_single_row(single_row::LOCKING_INFO),
        ),
        (
            table::LOCKING,
            TableDesc::object_table("Locking").with_columns(columns_locking),
        ),
        (
            table::MBR_CONTROL,
            TableDesc::object_table("MBRControl")
                .with_columns(columns_mbr_control)
                .with_single_row(single_row::MBR_CONTROL),
        ),
        (table::MBR, TableDesc::byte_table("MBR")),
        (
            table::K_AES_128,
            TableDesc::object_table("K_AES_128").with_columns(columns_k_aes_128),
        ),
        (
            table::K_AES_256,
            TableDesc::object_table("K_AES_256").with_columns(columns_k_aes_256),
        ),
    ];

    descs.into_iter().collect()
});

pub fn find_table(table: Uid) -> Option<TableDesc> {
    TABLE_DESCS.get(&table).cloned()
}

//------------------------------------------------------------------------------
// Module
//------------------------------------------------------------------------------

pub struct CoreModule;

static CORE_MODULE: Lazy<Arc<CoreModule>> = Lazy::new(|| Arc::new(CoreModule));

impl CoreModule {
    pub fn get() -> Arc<dyn Module> {
        CORE_MODULE.clone()
    }
}

impl Module for CoreModule {
    fn module_name(&self) -> &'static str {
        "Core"
    }

    fn module_kind(&self) -> ModuleKind {
        ModuleKind::Core
    }

    fn find_name(&self, uid: Uid, _sp: Option<Uid>) -> Option<String> {
        find_name(uid)
    }

    fn find_uid(&self, name: &str, _sp: Option<Uid>) -> Option<Uid> {
        find_uid(name)
    }

    fn find_table(&self, table: Uid) -> Option<TableDesc> {
        find_table(table)
    }

    fn find_type(&self, uid: Uid) -> Option<Type> {
        find_type(uid)
    }
}
