//! In-memory native connection used by the integration tests.
#![allow(dead_code)]

use ocisql::native::{CommitMode, Connector, NativeConnection, NativeError, NativeLob};
use ocisql::{BindDescriptor, BindValue, LobHandle, Row};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct LobState {
    data: Mutex<Vec<u8>>,
    closes: Mutex<u32>,
    frees: Mutex<u32>,
    broken: bool,
}

/// LOB kept in memory; clones share state.
#[derive(Clone, Default)]
pub struct MemLob(Arc<LobState>);

impl MemLob {
    pub fn data(&self) -> Vec<u8> {
        self.0.data.lock().unwrap().clone()
    }

    pub fn closes(&self) -> u32 {
        *self.0.closes.lock().unwrap()
    }

    pub fn frees(&self) -> u32 {
        *self.0.frees.lock().unwrap()
    }
}

impl NativeLob for MemLob {
    fn write_temporary(&self, data: &[u8]) -> Result<(), NativeError> {
        if self.0.broken {
            return Err(NativeError::new("LOB write failed").with_code(22990));
        }
        *self.0.data.lock().unwrap() = data.to_vec();
        Ok(())
    }

    fn save(&self, data: &[u8]) -> Result<(), NativeError> {
        self.write_temporary(data)
    }

    fn load(&self) -> Result<Vec<u8>, NativeError> {
        Ok(self.data())
    }

    fn close(&self) -> Result<(), NativeError> {
        *self.0.closes.lock().unwrap() += 1;
        Ok(())
    }

    fn free(&self) -> Result<(), NativeError> {
        *self.0.frees.lock().unwrap() += 1;
        if self.0.broken {
            return Err(NativeError::new("invalid LOB locator").with_code(22275));
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
struct Script {
    rows: Vec<Row>,
    affected: u64,
    execute_error: Option<NativeError>,
    prepare_error: Option<NativeError>,
}

pub struct FakeStatement {
    sql: String,
    rows: VecDeque<Row>,
    affected: u64,
    error: Option<NativeError>,
}

/// Scripted connection: answers per SQL text and records every native call.
#[derive(Default)]
pub struct ScriptedConn {
    scripts: RefCell<HashMap<String, Script>>,
    outputs: RefCell<HashMap<String, BindValue>>,
    calls: RefCell<Vec<String>>,
    lobs: RefCell<Vec<MemLob>>,
    broken_lobs: Cell<bool>,
}

impl ScriptedConn {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self, sql: &str, f: impl FnOnce(&mut Script)) -> &Self {
        f(self.scripts.borrow_mut().entry(sql.to_string()).or_default());
        self
    }

    /// Rows returned by `sql`.
    pub fn returning_rows(&self, sql: &str, rows: Vec<Row>) -> &Self {
        self.script(sql, |s| s.rows = rows)
    }

    /// Row count reported after `sql`.
    pub fn affecting(&self, sql: &str, count: u64) -> &Self {
        self.script(sql, |s| s.affected = count)
    }

    /// Make executing `sql` fail with an ORA code.
    pub fn failing(&self, sql: &str, code: i32, message: &str) -> &Self {
        let err = NativeError::new(message).with_code(code);
        self.script(sql, |s| s.execute_error = Some(err))
    }

    /// Make parsing `sql` fail.
    pub fn failing_prepare(&self, sql: &str, message: &str) -> &Self {
        let err = NativeError::new(message);
        self.script(sql, |s| s.prepare_error = Some(err))
    }

    /// Value reported for an output placeholder after execute.
    pub fn output(&self, name: &str, value: impl Into<BindValue>) -> &Self {
        self.outputs
            .borrow_mut()
            .insert(name.to_string(), value.into());
        self
    }

    /// LOBs allocated from now on fail to write and to free.
    pub fn breaking_lobs(&self) -> &Self {
        self.broken_lobs.set(true);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn lobs(&self) -> Vec<MemLob> {
        self.lobs.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl NativeConnection for ScriptedConn {
    type Statement = FakeStatement;

    fn prepare(&self, sql: &str) -> Result<FakeStatement, NativeError> {
        self.record(format!("prepare {sql}"));
        let script = self.scripts.borrow().get(sql).cloned().unwrap_or_default();
        if let Some(err) = script.prepare_error {
            return Err(err);
        }
        Ok(FakeStatement {
            sql: sql.to_string(),
            rows: script.rows.into(),
            affected: script.affected,
            error: None,
        })
    }

    fn bind_by_name(
        &self,
        _stmt: &mut FakeStatement,
        bind: &BindDescriptor,
    ) -> Result<(), NativeError> {
        let value = match &bind.value {
            BindValue::Null => "NULL".to_string(),
            BindValue::Text(text) => text.clone(),
            BindValue::LongRaw(bytes) => format!("<{} bytes>", bytes.len()),
            BindValue::Lob(_) => "<lob>".to_string(),
        };
        self.record(format!("bind {}={value}", bind.name));
        Ok(())
    }

    fn execute(&self, stmt: &mut FakeStatement, mode: CommitMode) -> Result<(), NativeError> {
        self.record(format!("execute {mode:?}"));
        let script = self.scripts.borrow().get(&stmt.sql).cloned().unwrap_or_default();
        match script.execute_error {
            Some(err) => {
                stmt.error = Some(err.clone());
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn bound_value(&self, _stmt: &FakeStatement, name: &str) -> Option<BindValue> {
        self.outputs.borrow().get(name).cloned()
    }

    fn fetch_all(&self, stmt: &mut FakeStatement) -> Result<Vec<Row>, NativeError> {
        self.record("fetch_all".to_string());
        Ok(stmt.rows.drain(..).collect())
    }

    fn fetch_one(&self, stmt: &mut FakeStatement) -> Result<Option<Row>, NativeError> {
        self.record("fetch_one".to_string());
        Ok(stmt.rows.pop_front())
    }

    fn num_rows(&self, stmt: &FakeStatement) -> u64 {
        stmt.affected
    }

    fn free_statement(&self, _stmt: FakeStatement) {
        self.record("free".to_string());
    }

    fn commit(&self) -> Result<(), NativeError> {
        self.record("commit".to_string());
        Ok(())
    }

    fn rollback(&self) -> Result<(), NativeError> {
        self.record("rollback".to_string());
        Ok(())
    }

    fn last_error(&self, stmt: Option<&FakeStatement>) -> Option<NativeError> {
        stmt.and_then(|s| s.error.clone())
    }

    fn new_lob(&self) -> Result<LobHandle, NativeError> {
        let lob = MemLob(Arc::new(LobState {
            broken: self.broken_lobs.get(),
            ..LobState::default()
        }));
        self.lobs.borrow_mut().push(lob.clone());
        Ok(LobHandle::new(lob))
    }
}

/// Connector accepting a single user/password pair.
pub struct FakeConnector {
    pub user: String,
    pub password: String,
}

impl Connector for FakeConnector {
    type Connection = ScriptedConn;

    fn connect(
        &self,
        user: &str,
        password: &str,
        _dbname: &str,
        _charset: &str,
    ) -> Result<ScriptedConn, NativeError> {
        if user == self.user && password == self.password {
            Ok(ScriptedConn::new())
        } else {
            Err(NativeError::new("invalid username/password; logon denied").with_code(1017))
        }
    }
}

pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs.iter().map(|&(k, v)| (k, v)).collect()
}
