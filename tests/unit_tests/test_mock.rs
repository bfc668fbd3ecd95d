// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::Arc;

use anyhow::Result;
use sed_client_rs::{
    client::{
        mock::MockDevice, session::Session, session_manager::SessionManager,
        tper::TrustedPeripheral,
    },
    error::Error,
    spec::{core, opal},
};

fn mock_session_manager() -> Result<Arc<SessionManager>> {
    let tper = TrustedPeripheral::new(Box::new(MockDevice::new()))?;
    Ok(Arc::new(SessionManager::new(Arc::new(tper))))
}

#[test]
fn discovery_yields_the_base_com_id() -> Result<()> {
    let tper = TrustedPeripheral::new(Box::new(MockDevice::new()))?;
    assert_eq!(tper.com_id(), MockDevice::BASE_COM_ID);
    assert_eq!(tper.com_id_extension(), 0);

    let desc = tper.desc();
    assert!(desc.tper.is_some());
    assert_eq!(desc.ssc.len(), 1);
    assert_eq!(desc.ssc[0].feature_name(), "Opal v1");

    // The Opal v1 module was loaded off the discovery data.
    assert_eq!(
        tper.modules()
            .find_name(opal::method::ACTIVATE, None)
            .as_deref(),
        Some("MethodID::Activate")
    );

    assert_eq!(tper.device_info().name, "Mock Device");
    Ok(())
}

#[tokio::test]
async fn com_id_management_commands_answer() -> Result<()> {
    let tper = TrustedPeripheral::new(Box::new(MockDevice::new()))?;
    assert!(tper.verify_com_id_valid().await?.is_valid());
    tper.stack_reset().await?;
    Ok(())
}

#[tokio::test]
async fn properties_come_back_from_the_mock() -> Result<()> {
    let session_manager = mock_session_manager()?;
    let result = session_manager.properties(None).await?;
    assert_eq!(result.tper_properties.get("MaxComPacketSize"), Some(&2048));
    assert!(result.host_properties.is_none());
    Ok(())
}

#[tokio::test]
async fn one_session_at_a_time() -> Result<()> {
    let session_manager = mock_session_manager()?;

    let session = Session::start(session_manager.clone(), opal::sp::ADMIN, None, None).await?;
    assert!(session.tper_session_number() >= 0x1000);

    let err = Session::start(session_manager.clone(), opal::sp::ADMIN, None, None)
        .await
        .expect_err("the mock supports a single session");
    assert!(matches!(err, Error::SecurityProviderBusy));

    session.end().await?;
    // After EndSession a new session may start again.
    let session = Session::start(session_manager.clone(), opal::sp::ADMIN, None, None).await?;
    session.end().await?;
    Ok(())
}

#[tokio::test]
async fn in_session_methods_are_unanswered() -> Result<()> {
    let session_manager = mock_session_manager()?;
    let session = Session::start(session_manager.clone(), opal::sp::ADMIN, None, None).await?;

    let err = session
        .base()
        .get(core::authority::SID, 0)
        .await
        .expect_err("the mock does not serve table reads");
    assert!(matches!(err, Error::NoResponse));

    session.end().await?;
    Ok(())
}
