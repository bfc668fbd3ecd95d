// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::{
    client::session_manager::{SessionManager, StartSessionOptions, unwrap_packet},
    error::{Error, Result},
    models::{
        method::{MethodCall, MethodResult, check_status, pack_args},
        stream::{decode_stream, encode_stream},
        uid::Uid,
        value::Value,
    },
    spec::{core::method, opal::method as opal_method},
};

const PROTOCOL: u8 = 0x01;

static NEXT_HOST_SESSION_NUMBER: AtomicU32 = AtomicU32::new(1);

/// Host session numbers are minted process-wide and never reused.
fn next_host_session_number() -> u32 {
    NEXT_HOST_SESSION_NUMBER.fetch_add(1, Ordering::Relaxed)
}

/// An open session with a security provider, identified by the
/// (TPer session number, host session number) pair.
///
/// Dropping a session issues EndSession best-effort on the current runtime;
/// call [`Session::end`] to close it deliberately.
pub struct Session {
    session_manager: Arc<SessionManager>,
    tper_session_number: u32,
    host_session_number: u32,
    ended: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tper_session_number", &self.tper_session_number)
            .field("host_session_number", &self.host_session_number)
            .field("ended", &self.ended)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Opens a read-write session, optionally authenticating an authority
    /// with a password during session startup.
    pub async fn start(
        session_manager: Arc<SessionManager>,
        security_provider: Uid,
        password: Option<&[u8]>,
        authority: Option<Uid>,
    ) -> Result<Session> {
        let host_session_number = next_host_session_number();
        let options = StartSessionOptions {
            host_challenge: password.map(<[u8]>::to_vec),
            host_signing_authority: authority,
            ..StartSessionOptions::default()
        };
        let result = session_manager
            .start_session(host_session_number, security_provider, true, options)
            .await?;
        debug!(
            tper_session_number = result.tper_session_number,
            host_session_number, "session started"
        );
        Ok(Session {
            session_manager,
            tper_session_number: result.tper_session_number,
            host_session_number,
            ended: false,
        })
    }

    pub fn tper_session_number(&self) -> u32 {
        self.tper_session_number
    }

    pub fn host_session_number(&self) -> u32 {
        self.host_session_number
    }

    /// Base-template operations.
    pub fn base(&self) -> BaseTemplate<'_> {
        BaseTemplate { session: self }
    }

    /// Opal SSC operations.
    pub fn opal(&self) -> OpalTemplate<'_> {
        OpalTemplate { session: self }
    }

    /// Closes the session on the TPer.
    pub async fn end(mut self) -> Result<()> {
        self.ended = true;
        self.session_manager
            .end_session(self.tper_session_number, self.host_session_number)
            .await
    }

    async fn invoke(&self, call: MethodCall) -> Result<MethodResult> {
        let method_name = self.session_manager.method_name(call.method_id);
        let request = call.to_value();
        debug!(
            method = %method_name,
            tper_session_number = self.tper_session_number,
            host_session_number = self.host_session_number,
            request = %request,
            "session call"
        );

        let payload = encode_stream(&request, true)?;
        let packet = self.session_manager.create_packet(
            payload,
            self.tper_session_number,
            self.host_session_number,
        );
        let tper = self.session_manager.tper();
        let response = tper.send_packet(PROTOCOL, &packet).await?;
        let response_bytes = unwrap_packet(&response)?;
        let response_value = decode_stream(response_bytes, true)?;

        debug!(method = %method_name, response = %response_value, "session reply");
        let result = MethodResult::from_value(&response_value).map_err(|err| match err {
            terminated @ Error::SessionTerminated(_) => terminated,
            other => Error::InvalidResponse {
                method: method_name.clone(),
                message: other.to_string(),
            },
        })?;
        check_status(&method_name, result.status)?;
        Ok(result)
    }

    fn invalid_response(&self, method_id: Uid, message: impl Into<String>) -> Error {
        Error::InvalidResponse {
            method: self.session_manager.method_name(method_id),
            message: message.into(),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.ended {
            return;
        }
        let session_manager = self.session_manager.clone();
        let tper_session_number = self.tper_session_number;
        let host_session_number = self.host_session_number;
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = session_manager
                        .end_session(tper_session_number, host_session_number)
                        .await
                    {
                        warn!(
                            tper_session_number,
                            host_session_number, "failed to end session: {err}"
                        );
                    }
                });
            },
            Err(_) => warn!(
                tper_session_number,
                host_session_number, "session dropped outside a runtime; not closed"
            ),
        }
    }
}

/// Base-template methods, invoked on table rows and objects of the session's
/// security provider.
pub struct BaseTemplate<'a> {
    session: &'a Session,
}

impl BaseTemplate<'_> {
    /// Reads the half-open column range `[start_column, end_column)` of an
    /// object. Columns the TPer omits come back as empty values.
    pub async fn get_columns(
        &self,
        object: Uid,
        start_column: u32,
        end_column: u32,
    ) -> Result<Vec<Value>> {
        if end_column <= start_column {
            return Ok(Vec::new());
        }
        let cell_block = Value::List(vec![
            Value::named(3u32, start_column),
            Value::named(4u32, end_column - 1),
        ]);
        let result = self
            .session
            .invoke(MethodCall::new(object, method::GET, vec![cell_block]))
            .await?;

        let labeled = result
            .values
            .first()
            .ok_or_else(|| self.session.invalid_response(method::GET, "missing result list"))?
            .get_list()?;

        let mut values = vec![Value::Empty; (end_column - start_column) as usize];
        for item in labeled {
            let named = item.get_named()?;
            let index = named.name.get_uint()? as u32;
            if index < start_column || index >= end_column {
                return Err(self.session.invalid_response(method::GET, "too many columns"));
            }
            values[(index - start_column) as usize] = named.value.clone();
        }
        Ok(values)
    }

    /// Reads a single column of an object.
    pub async fn get(&self, object: Uid, column: u32) -> Result<Value> {
        let mut values = self.get_columns(object, column, column + 1).await?;
        if values.is_empty() {
            return Err(self.session.invalid_response(method::GET, "zero columns"));
        }
        Ok(values.remove(0))
    }

    /// Writes the given columns of an object.
    pub async fn set(
        &self,
        object: Uid,
        columns: &[u32],
        values: &[Value],
    ) -> Result<()> {
        let labeled = columns
            .iter()
            .zip(values)
            .map(|(&column, value)| Value::named(column, value.clone()))
            .collect::<Vec<_>>();
        let args = pack_args(Vec::new(), vec![Some(Value::List(labeled))]);
        self.session
            .invoke(MethodCall::new(object, method::SET, args))
            .await?;
        Ok(())
    }

    /// Writes a single column of an object.
    pub async fn set_cell(&self, object: Uid, column: u32, value: Value) -> Result<()> {
        self.set(object, &[column], &[value]).await
    }

    /// Pages through a table, returning up to `count` row UIDs after `from`
    /// (or from the beginning).
    pub async fn next(
        &self,
        table: Uid,
        from: Option<Uid>,
        count: u32,
    ) -> Result<Vec<Uid>> {
        let args = pack_args(
            Vec::new(),
            vec![from.map(Value::from), Some(Value::from(count))],
        );
        let result = self
            .session
            .invoke(MethodCall::new(table, method::NEXT, args))
            .await?;

        let rows = result
            .values
            .first()
            .ok_or_else(|| self.session.invalid_response(method::NEXT, "missing result list"))?
            .get_list()?;
        rows.iter().map(Value::get_uid).collect()
    }

    /// Convenience single-step iteration over a table.
    pub async fn next_one(&self, table: Uid, from: Option<Uid>) -> Result<Option<Uid>> {
        let rows = self.next(table, from, 1).await?;
        Ok(rows.into_iter().next())
    }

    /// Authenticates an authority within this session. An integer reply is
    /// the verdict; a bytes reply would start a challenge exchange, which is
    /// not implemented.
    pub async fn authenticate(&self, authority: Uid, proof: Option<&[u8]>) -> Result<()> {
        let args = pack_args(
            vec![Value::from(authority)],
            vec![proof.map(Value::from)],
        );
        let result = self
            .session
            .invoke(MethodCall::new(Uid::THIS_SP, method::AUTHENTICATE, args))
            .await?;

        let verdict = result.values.first().ok_or_else(|| {
            self.session
                .invalid_response(method::AUTHENTICATE, "missing result")
        })?;
        if verdict.is_integer() {
            if verdict.get_uint()? == 0 {
                return Err(Error::Password);
            }
            return Ok(());
        }
        Err(Error::NotImplemented(
            "challenge protocol for method 'Authenticate' is not implemented".to_string(),
        ))
    }

    /// Regenerates the key material of a credential object.
    pub async fn gen_key(
        &self,
        object: Uid,
        public_exponent: Option<u32>,
        pin_length: Option<u32>,
    ) -> Result<()> {
        let args = pack_args(
            Vec::new(),
            vec![
                public_exponent.map(Value::from),
                pin_length.map(Value::from),
            ],
        );
        self.session
            .invoke(MethodCall::new(object, method::GEN_KEY, args))
            .await?;
        Ok(())
    }
}

/// Opal SSC methods.
pub struct OpalTemplate<'a> {
    session: &'a Session,
}

impl OpalTemplate<'_> {
    /// Reverts a security provider to factory state.
    pub async fn revert(&self, security_provider: Uid) -> Result<()> {
        self.session
            .invoke(MethodCall::new(
                security_provider,
                opal_method::REVERT,
                Vec::new(),
            ))
            .await?;
        Ok(())
    }

    /// Activates a manufactured-inactive security provider.
    pub async fn activate(&self, security_provider: Uid) -> Result<()> {
        self.session
            .invoke(MethodCall::new(
                security_provider,
                opal_method::ACTIVATE,
                Vec::new(),
            ))
            .await?;
        Ok(())
    }
}
