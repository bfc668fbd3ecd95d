// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::error::Result;

/// Identity of a storage device, as shown to users when picking a drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub serial: String,
    pub interface: String,
}

/// The security command seam every backend implements.
///
/// `protocol_specific` carries the two protocol-dependent bytes of the
/// command (for TCG protocols, the ComID). The trait does not prescribe an
/// ordering; callers are responsible for the byte order their protocol
/// expects.
pub trait StorageDevice: Send + Sync {
    /// IF-SEND: transfers `data` to the device.
    fn security_send(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        data: &[u8],
    ) -> Result<()>;

    /// IF-RECV: fills `out` with as much response as the device has.
    fn security_receive(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        out: &mut [u8],
    ) -> Result<()>;

    fn info(&self) -> DeviceInfo;
}
