// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs::File, os::fd::AsRawFd, path::Path};

use crate::{
    client::device::{DeviceInfo, StorageDevice},
    error::{Error, Result},
};

const OPCODE_IDENTIFY_CONTROLLER: u8 = 0x06;
const OPCODE_SECURITY_SEND: u8 = 0x81;
const OPCODE_SECURITY_RECV: u8 = 0x82;

// _IOWR('N', 0x41, struct nvme_admin_cmd)
const NVME_IOCTL_ADMIN_CMD: libc::c_ulong = 0xC048_4E41;

/// Mirrors `struct nvme_admin_cmd` of the kernel uapi.
#[repr(C)]
#[derive(Default)]
struct NvmeAdminCmd {
    opcode: u8,
    flags: u8,
    rsvd1: u16,
    nsid: u32,
    cdw2: u32,
    cdw3: u32,
    metadata: u64,
    addr: u64,
    metadata_len: u32,
    data_len: u32,
    cdw10: u32,
    cdw11: u32,
    cdw12: u32,
    cdw13: u32,
    cdw14: u32,
    cdw15: u32,
    timeout_ms: u32,
    result: u32,
}

/// An NVMe drive addressed through the admin command ioctl.
pub struct NvmeDevice {
    file: File,
    model_number: String,
    serial_number: String,
}

impl NvmeDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<NvmeDevice> {
        let file = File::options()
            .read(true)
            .write(true)
            .open(path.as_ref())
            .map_err(|err| {
                Error::Device(format!(
                    "failed to open NVMe device '{}': {err}",
                    path.as_ref().display()
                ))
            })?;

        let identity = identify_controller(&file)?;
        Ok(NvmeDevice {
            file,
            model_number: ascii_field(&identity[24..64]),
            serial_number: ascii_field(&identity[4..24]),
        })
    }

    fn admin_command(&self, mut command: NvmeAdminCmd) -> Result<()> {
        let status = unsafe {
            libc::ioctl(self.file.as_raw_fd(), NVME_IOCTL_ADMIN_CMD, &mut command)
        };
        if status < 0 {
            return Err(Error::Device(format!(
                "error communicating with NVMe device: {}",
                std::io::Error::last_os_error()
            )));
        }
        if status != 0 {
            return Err(Error::Device(format!(
                "NVMe device returned an error: {status:#x}"
            )));
        }
        Ok(())
    }
}

fn identify_controller(file: &File) -> Result<[u8; 4096]> {
    let mut data = [0u8; 4096];
    let mut command = NvmeAdminCmd {
        opcode: OPCODE_IDENTIFY_CONTROLLER,
        addr: data.as_mut_ptr() as u64,
        data_len: data.len() as u32,
        cdw10: 0x0000_0001,
        ..NvmeAdminCmd::default()
    };
    let status = unsafe { libc::ioctl(file.as_raw_fd(), NVME_IOCTL_ADMIN_CMD, &mut command) };
    if status != 0 {
        return Err(Error::Device(format!(
            "identify controller failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok(data)
}

fn ascii_field(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}

/// CDW10 packs the protocol and the protocol-specific bytes; CDW11 carries
/// the transfer length.
fn security_cdw10(protocol: u8, protocol_specific: [u8; 2]) -> u32 {
    (u32::from(protocol) << 24)
        | (u32::from(protocol_specific[1]) << 16)
        | (u32::from(protocol_specific[0]) << 8)
}

impl StorageDevice for NvmeDevice {
    fn security_send(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        data: &[u8],
    ) -> Result<()> {
        self.admin_command(NvmeAdminCmd {
            opcode: OPCODE_SECURITY_SEND,
            addr: data.as_ptr() as u64,
            data_len: data.len() as u32,
            cdw10: security_cdw10(protocol, protocol_specific),
            cdw11: data.len() as u32,
            ..NvmeAdminCmd::default()
        })
    }

    fn security_receive(
        &self,
        protocol: u8,
        protocol_specific: [u8; 2],
        out: &mut [u8],
    ) -> Result<()> {
        self.admin_command(NvmeAdminCmd {
            opcode: OPCODE_SECURITY_RECV,
            addr: out.as_mut_ptr() as u64,
            data_len: out.len() as u32,
            cdw10: security_cdw10(protocol, protocol_specific),
            cdw11: out.len() as u32,
            ..NvmeAdminCmd::default()
        })
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo {
            name: self.model_number.clone(),
            serial: self.serial_number.clone(),
            interface: "NVMe".to_string(),
        }
    }
}
