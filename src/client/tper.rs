// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    cfg::config::RuntimeConfig,
    client::device::{DeviceInfo, StorageDevice},
    error::{Error, Result},
    models::{
        comid::{
            self, ComIdState, STACK_RESET_RESPONSE_LEN, VERIFY_COMID_VALID_RESPONSE_LEN,
        },
        discovery::{SscFeatureDesc, TperDesc, parse_discovery},
        packet::ComPacket,
    },
    spec::{core::CoreModule, module::ModuleCollection, opal::OpalModule},
};

const PROTOCOL_COMID_MGMT: u8 = 0x02;
const COMID_LEVEL0_DISCOVERY: u16 = 0x0001;
const COMID_REQUEST_COMID: u16 = 0x0000;
const COMID_TPER_RESET: u16 = 0x0004;

const DISCOVERY_BUFFER_LEN: usize = 2048;
/// Floor for the regrown receive buffer when the TPer asks for more room.
const GROWN_BUFFER_LEN: usize = 1 << 20;

const POLL_SLEEP_INITIAL: Duration = Duration::from_micros(50);
const POLL_SLEEP_MAX: Duration = Duration::from_millis(20);
/// The management commands respond out of band and are polled slower.
const MGMT_POLL_SLEEP: Duration = Duration::from_millis(16);

/// The device-side endpoint of the TCG stack: owns the ComID conversation
/// and moves ComPackets across IF-SEND/IF-RECV.
pub struct TrustedPeripheral {
    device: Box<dyn StorageDevice>,
    desc: TperDesc,
    modules: ModuleCollection,
    com_id: u16,
    com_id_extension: u16,
    response_buffer_len: usize,
    /// Serializes whole send-then-poll exchanges, packet traffic and ComID
    /// management alike, so packets never tear.
    exchange: Mutex<()>,
    cancel: CancellationToken,
}

impl TrustedPeripheral {
    /// Runs Level-0 Discovery and acquires a ComID: dynamically when the
    /// TPer supports ComID management, from the SSC descriptor otherwise.
    pub fn new(device: Box<dyn StorageDevice>) -> Result<TrustedPeripheral> {
        Self::with_runtime(device, &RuntimeConfig::default())
    }

    /// Same as [`TrustedPeripheral::new`] with runtime knobs applied.
    pub fn with_runtime(
        device: Box<dyn StorageDevice>,
        runtime: &RuntimeConfig,
    ) -> Result<TrustedPeripheral> {
        let desc = discovery(device.as_ref())?;

        let tper_feature = desc.tper.ok_or_else(|| {
            Error::Device("no TPer feature descriptor in level 0 discovery".to_string())
        })?;
        let (com_id, com_id_extension) = if tper_feature.com_id_mgmt_supported {
            request_com_id(device.as_ref())?
        } else {
            desc.ssc
                .first()
                .map(|ssc| (ssc.base_com_id(), 0))
                .ok_or_else(|| {
                    Error::Device("could not acquire or determine ComID".to_string())
                })?
        };
        debug!(com_id, com_id_extension, "ComID acquired");

        let mut modules = ModuleCollection::new();
        for ssc in &desc.ssc {
            match ssc {
                SscFeatureDesc::Opal1(..) => modules.load(OpalModule::v1()),
                SscFeatureDesc::Opal2(..) => modules.load(OpalModule::v2()),
                _ => {},
            }
        }
        modules.load(CoreModule::get());

        Ok(TrustedPeripheral {
            device,
            desc,
            modules,
            com_id,
            com_id_extension,
            response_buffer_len: runtime.response_buffer_bytes,
            exchange: Mutex::new(()),
            cancel: CancellationToken::new(),
        })
    }

    pub fn com_id(&self) -> u16 {
        self.com_id
    }

    pub fn com_id_extension(&self) -> u16 {
        self.com_id_extension
    }

    pub fn desc(&self) -> &TperDesc {
        &self.desc
    }

    pub fn modules(&self) -> &ModuleCollection {
        &self.modules
    }

    pub fn device_info(&self) -> DeviceInfo {
        self.device.info()
    }

    /// Aborts any in-flight polling loop. After a cancellation mid-send the
    /// transport must be recovered with [`TrustedPeripheral::stack_reset`].
    pub fn cancel_now(&self) {
        self.cancel.cancel();
    }

    /// Sends one ComPacket and polls until the response is complete.
    ///
    /// The poll interval starts at 50 µs and doubles up to a 20 ms ceiling;
    /// the receive buffer grows to at least `min_transfer` (and at least
    /// 1 MiB) when the TPer reports it cannot fit its response.
    pub async fn send_packet(
        &self,
        protocol: u8,
        packet: &ComPacket,
    ) -> Result<ComPacket> {
        let _guard = self.exchange.lock().await;

        let request = packet.to_bytes();
        self.security_send(protocol, self.com_id, &request)?;

        let mut response = BytesMut::zeroed(self.response_buffer_len);
        let mut sleep_time = POLL_SLEEP_INITIAL;
        loop {
            self.security_receive(protocol, self.com_id, &mut response)?;
            let result = ComPacket::from_bytes(&response)?;

            if result.min_transfer as usize > response.len() {
                let new_len = (result.min_transfer as usize).max(GROWN_BUFFER_LEN);
                debug!(new_len, "growing receive buffer");
                response.resize(new_len, 0);
            }
            if result.outstanding_data == 0 {
                return Ok(result);
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return Err(Error::Device("packet exchange cancelled".to_string()));
                },
                _ = tokio::time::sleep(sleep_time) => {},
            }
            if sleep_time * 2 < POLL_SLEEP_MAX {
                sleep_time *= 2;
            }
        }
    }

    /// VERIFY_COMID_VALID handshake for the owned ComID.
    pub async fn verify_com_id_valid(&self) -> Result<ComIdState> {
        let _guard = self.exchange.lock().await;
        self.verify_com_id_valid_exchange()
    }

    fn verify_com_id_valid_exchange(&self) -> Result<ComIdState> {
        let request =
            comid::encode_verify_comid_valid_request(self.com_id, self.com_id_extension);
        self.security_send(PROTOCOL_COMID_MGMT, self.com_id, &request)?;

        let mut buffer = [0u8; VERIFY_COMID_VALID_RESPONSE_LEN];
        loop {
            buffer.fill(0);
            self.security_receive(PROTOCOL_COMID_MGMT, self.com_id, &mut buffer)?;
            let response = comid::parse_verify_comid_valid_response(&buffer)?;
            if response.header.request_code == 0 {
                return Err(Error::NoResponse);
            }
            if response.header.available_data_length != 0 {
                return Ok(response.com_id_state);
            }
            std::thread::sleep(MGMT_POLL_SLEEP);
        }
    }

    /// Aborts all sessions on the ComID and resets the communication stack.
    pub async fn stack_reset(&self) -> Result<()> {
        let _guard = self.exchange.lock().await;
        self.stack_reset_exchange()
    }

    fn stack_reset_exchange(&self) -> Result<()> {
        let request = comid::encode_stack_reset_request(self.com_id, self.com_id_extension);
        self.security_send(PROTOCOL_COMID_MGMT, self.com_id, &request)?;

        let mut buffer = [0u8; STACK_RESET_RESPONSE_LEN];
        loop {
            buffer.fill(0);
            self.security_receive(PROTOCOL_COMID_MGMT, self.com_id, &mut buffer)?;
            let response = comid::parse_stack_reset_response(&buffer)?;
            if response.header.request_code == 0 {
                return Err(Error::NoResponse);
            }
            if response.header.available_data_length != 0 {
                if !response.success {
                    return Err(Error::Device(
                        "stack reset failed with failure code".to_string(),
                    ));
                }
                return Ok(());
            }
            std::thread::sleep(MGMT_POLL_SLEEP);
        }
    }

    /// Programmatic TPer reset.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.exchange.lock().await;
        self.security_send(PROTOCOL_COMID_MGMT, COMID_TPER_RESET, &[0u8])
    }

    fn security_send(&self, protocol: u8, com_id: u16, payload: &[u8]) -> Result<()> {
        // The protocol-specific field wants the ComID LSB first.
        self.device
            .security_send(protocol, com_id.to_le_bytes(), payload)
    }

    fn security_receive(&self, protocol: u8, com_id: u16, out: &mut [u8]) -> Result<()> {
        self.device
            .security_receive(protocol, com_id.to_le_bytes(), out)
    }
}

impl Drop for TrustedPeripheral {
    fn drop(&mut self) {
        // With the last owner gone no exchange can be in flight; try_lock
        // only fails if a cancelled task leaked its guard.
        match self.exchange.try_lock() {
            Ok(_guard) => {
                if let Err(err) = self.stack_reset_exchange() {
                    warn!("stack reset on teardown failed: {err}");
                }
            },
            Err(_) => warn!("transport busy on teardown; stack reset skipped"),
        }
    }
}

fn discovery(device: &dyn StorageDevice) -> Result<TperDesc> {
    let mut response = vec![0u8; DISCOVERY_BUFFER_LEN];
    device.security_receive(0x01, COMID_LEVEL0_DISCOVERY.to_le_bytes(), &mut response)?;
    parse_discovery(&response)
}

fn request_com_id(device: &dyn StorageDevice) -> Result<(u16, u16)> {
    let mut response = [0xFFu8; 4];
    device.security_receive(
        PROTOCOL_COMID_MGMT,
        COMID_REQUEST_COMID.to_le_bytes(),
        &mut response,
    )?;
    let com_id = u16::from_be_bytes([response[0], response[1]]);
    let com_id_extension = u16::from_be_bytes([response[2], response[3]]);
    Ok((com_id, com_id_extension))
}
