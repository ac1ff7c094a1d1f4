use super::*;
use crate::lob::LobHandle;
use crate::param::BindDescriptor;
use crate::value::BindValue;
use std::sync::{Arc, Mutex};

// ── Minimal native connection for driver tests ──

#[derive(Default)]
struct Fake {
    calls: Arc<Mutex<Vec<String>>>,
    fail_execute: Option<NativeError>,
    fail_prepare: Option<NativeError>,
    fail_fetch: bool,
    stmt_error: Option<NativeError>,
    rows: Vec<Row>,
    affected: u64,
}

impl Fake {
    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl NativeConnection for Fake {
    type Statement = Vec<Row>;

    fn prepare(&self, _sql: &str) -> Result<Vec<Row>, NativeError> {
        self.log("prepare");
        match &self.fail_prepare {
            Some(err) => Err(err.clone()),
            None => Ok(self.rows.clone()),
        }
    }

    fn bind_by_name(&self, _: &mut Vec<Row>, bind: &BindDescriptor) -> Result<(), NativeError> {
        self.log(&format!("bind {}", bind.name));
        if bind.name == ":BAD" {
            return Err(NativeError::new("illegal variable name/number").with_code(1036));
        }
        Ok(())
    }

    fn execute(&self, _: &mut Vec<Row>, mode: CommitMode) -> Result<(), NativeError> {
        self.log(&format!("execute {mode:?}"));
        match &self.fail_execute {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn bound_value(&self, _: &Vec<Row>, name: &str) -> Option<BindValue> {
        (name == ":OUT").then(|| BindValue::from("42"))
    }

    fn fetch_all(&self, stmt: &mut Vec<Row>) -> Result<Vec<Row>, NativeError> {
        self.log("fetch_all");
        if self.fail_fetch {
            return Err(NativeError::new("fetch out of sequence").with_code(1002));
        }
        Ok(std::mem::take(stmt))
    }

    fn fetch_one(&self, stmt: &mut Vec<Row>) -> Result<Option<Row>, NativeError> {
        self.log("fetch_one");
        Ok((!stmt.is_empty()).then(|| stmt.remove(0)))
    }

    fn num_rows(&self, _: &Vec<Row>) -> u64 {
        self.affected
    }

    fn free_statement(&self, _: Vec<Row>) {
        self.log("free");
    }

    fn commit(&self) -> Result<(), NativeError> {
        self.log("commit");
        Ok(())
    }

    fn rollback(&self) -> Result<(), NativeError> {
        self.log("rollback");
        Ok(())
    }

    fn last_error(&self, stmt: Option<&Vec<Row>>) -> Option<NativeError> {
        stmt.and(self.stmt_error.clone())
    }

    fn new_lob(&self) -> Result<LobHandle, NativeError> {
        Err(NativeError::new("no LOB support"))
    }
}

fn users() -> Vec<Row> {
    vec![
        [("ID", "1"), ("NAME", "alice")].into_iter().collect(),
        [("ID", "2"), ("NAME", "bob")].into_iter().collect(),
    ]
}

#[test]
fn test_call_sequence() {
    let fake = Fake {
        affected: 3,
        ..Fake::default()
    };
    let driver = Driver::new(&fake);
    let mut bind = ParameterBinder::new();
    bind.add(":A", 1).unwrap().add(":B", "x").unwrap();

    let count = driver
        .execute_update("UPDATE t SET a = :A WHERE b = :B", Some(&mut bind))
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        fake.calls(),
        ["prepare", "bind :A", "bind :B", "execute CommitOnSuccess", "free"]
    );
}

#[test]
fn test_manual_mode_defers_commit() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);

    assert_eq!(driver.transaction_mode(), TransactionMode::AutoCommit);
    driver.begin_transaction().begin_transaction();
    assert_eq!(driver.transaction_mode(), TransactionMode::Manual);

    driver.execute_update("DELETE FROM t", None).unwrap();
    driver.commit_transaction().unwrap();

    assert_eq!(driver.transaction_mode(), TransactionMode::AutoCommit);
    assert_eq!(
        fake.calls(),
        ["prepare", "execute NoAutoCommit", "free", "commit"]
    );
}

#[test]
fn test_commit_and_rollback_without_transaction() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);

    driver.commit_transaction().unwrap();
    driver.rollback_transaction().unwrap();

    assert!(fake.calls().is_empty());
    assert_eq!(driver.transaction_mode(), TransactionMode::AutoCommit);
}

#[test]
fn test_fetch_helpers() {
    let fake = Fake {
        rows: users(),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    let rows = driver.fetch_all_rows("SELECT * FROM users", None).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("NAME").unwrap().as_str(), Some("bob"));

    let first = driver.fetch_one_row("SELECT * FROM users", None).unwrap();
    assert_eq!(first.unwrap().get("ID").unwrap().as_str(), Some("1"));

    let columns = driver.fetch_all_columns("SELECT * FROM users", None).unwrap();
    assert_eq!(columns[0], [Value::from("1"), Value::from("alice")]);

    let first_column = driver.fetch_first_column("SELECT * FROM users", None).unwrap();
    assert_eq!(first_column, [Value::from("1"), Value::from("alice")]);

    assert_eq!(fake.count_frees(), 4);
}

#[test]
fn test_fetch_on_empty_result() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);

    assert!(driver.fetch_all_rows("SELECT 1 FROM dual WHERE 1 = 0", None).unwrap().is_empty());
    assert!(driver.fetch_one_row("SELECT 1 FROM dual WHERE 1 = 0", None).unwrap().is_none());
    assert!(driver.fetch_first_column("SELECT 1 FROM dual WHERE 1 = 0", None).unwrap().is_empty());
}

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
}

impl FromRow for User {
    fn from_row(row: &Row) -> OciResult<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

#[test]
fn test_fetch_as() {
    let fake = Fake {
        rows: users(),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    let all: Vec<User> = driver.fetch_all_as("SELECT * FROM users", None).unwrap();
    assert_eq!(all[1], User { id: 2, name: "bob".into() });

    let one: Option<User> = driver.fetch_one_as("SELECT * FROM users", None).unwrap();
    assert_eq!(one.unwrap().id, 1);
}

#[test]
fn test_statement_is_freed_once() {
    let fake = Fake {
        rows: users(),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    {
        let mut stmt = driver.execute_query("SELECT * FROM users", None).unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM users");
        assert!(stmt.handle().is_some());
        assert_eq!(stmt.fetch_one().unwrap().unwrap().len(), 2);
        assert_eq!(fake.count_frees(), 0);
    }
    assert_eq!(fake.count_frees(), 1);

    let stmt = driver.execute_query("SELECT * FROM users", None).unwrap();
    stmt.free();
    assert_eq!(fake.count_frees(), 2);
}

#[test]
fn test_output_bind_is_read_back() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);
    let mut bind = ParameterBinder::new();
    bind.add(":IN", 1).unwrap().add_output(":OUT", 10).unwrap();

    driver
        .execute_update("BEGIN :OUT := :IN * 42; END;", Some(&mut bind))
        .unwrap();

    assert_eq!(bind.get_value(":OUT").unwrap().as_text(), Some("42"));
    assert_eq!(bind.get_value(":IN").unwrap().as_text(), Some("1"));
}

#[test]
fn test_execute_failure_rolls_back_and_frees() {
    let fake = Fake {
        fail_execute: Some(NativeError::new("table or view does not exist").with_code(942)),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);
    let mut bind = ParameterBinder::new();
    bind.add(":ID", 5).unwrap();

    driver.begin_transaction();
    let err = driver
        .execute_update("DELETE FROM missing WHERE id = :ID", Some(&mut bind))
        .unwrap_err();

    assert_eq!(driver.transaction_mode(), TransactionMode::AutoCommit);
    match err {
        OciError::QueryFailed { message, sql, binds } => {
            assert_eq!(message, "ORA-00942: table or view does not exist");
            assert_eq!(sql, "DELETE FROM missing WHERE id = :ID");
            assert_eq!(binds[0]["name"], ":ID");
            assert_eq!(binds[0]["value"], "5");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        fake.calls(),
        ["prepare", "bind :ID", "execute NoAutoCommit", "free", "rollback"]
    );
}

#[test]
fn test_statement_diagnostic_wins_over_returned_error() {
    let fake = Fake {
        fail_execute: Some(NativeError::new("generic")),
        stmt_error: Some(NativeError::new("unique constraint violated").with_code(1)),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    let err = driver.execute_update("INSERT INTO t VALUES (1)", None).unwrap_err();
    assert!(err.to_string().starts_with("SQL error: ORA-00001: unique constraint violated"));
}

#[test]
fn test_unknown_error_fallback() {
    let fake = Fake {
        fail_execute: Some(NativeError::new("")),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    let err = driver.execute_update("INSERT INTO t VALUES (1)", None).unwrap_err();
    assert!(matches!(err, OciError::QueryFailed { ref message, .. } if message == "unknown error"));
}

#[test]
fn test_prepare_failure() {
    let fake = Fake {
        fail_prepare: Some(NativeError::new("invalid SQL statement").with_code(900)),
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    driver.begin_transaction();
    let err = driver.execute_update("SELEC 1", None).unwrap_err();

    assert!(err.is_prepare_failed());
    assert_eq!(err.sql(), Some("SELEC 1"));
    assert!(!driver.in_transaction());
    assert_eq!(fake.calls(), ["prepare", "rollback"]);
}

#[test]
fn test_fetch_failure_goes_through_error_path() {
    let fake = Fake {
        fail_fetch: true,
        ..Fake::default()
    };
    let driver = Driver::new(&fake);

    let mut bind = ParameterBinder::new();
    bind.add(":ID", 7).unwrap();

    driver.begin_transaction();
    let err = driver
        .fetch_all_rows("SELECT * FROM t WHERE id = :ID", Some(&mut bind))
        .unwrap_err();

    assert!(err.is_query_failed());
    assert!(!driver.in_transaction());
    assert_eq!(fake.count_frees(), 1);
    let binds = err.bind_diagnostics().unwrap();
    assert_eq!(binds[0]["name"], ":ID");
    assert_eq!(binds[0]["value"], "7");
}

/// Appends hook callbacks to the same log the fake connection writes to.
struct SequenceHook(Arc<Mutex<Vec<String>>>);

impl QueryHook for SequenceHook {
    fn on_start(&self) {
        self.0.lock().unwrap().push("on_start".to_string());
    }

    fn on_end(&self, _sql: &str, _binds: &[BindDescriptor]) {
        self.0.lock().unwrap().push("on_end".to_string());
    }
}

#[test]
fn test_hook_brackets_execute_only() {
    let fake = Fake::default();
    let driver = Driver::with_hook(&fake, SequenceHook(fake.calls.clone()));
    let mut bind = ParameterBinder::new();
    bind.add(":A", 1).unwrap();

    driver
        .execute_update("UPDATE t SET a = :A", Some(&mut bind))
        .unwrap();

    assert_eq!(
        fake.calls(),
        [
            "prepare",
            "bind :A",
            "on_start",
            "execute CommitOnSuccess",
            "on_end",
            "free"
        ]
    );
}

#[test]
fn test_hook_skipped_when_bind_fails() {
    let fake = Fake::default();
    let driver = Driver::with_hook(&fake, SequenceHook(fake.calls.clone()));
    let mut bind = ParameterBinder::new();
    bind.add(":BAD", 1).unwrap();

    assert!(driver
        .execute_update("UPDATE t SET a = :BAD", Some(&mut bind))
        .is_err());
    assert!(!fake.calls().iter().any(|c| c.starts_with("on_")));
}

#[test]
fn test_transaction_helper() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);

    let value = driver
        .transaction(|d| {
            assert!(d.in_transaction());
            d.execute_update("UPDATE t SET a = 1", None)?;
            Ok(7)
        })
        .unwrap();
    assert_eq!(value, 7);
    assert_eq!(fake.calls().last().map(String::as_str), Some("commit"));

    let result: OciResult<()> = driver.transaction(|_| Err(OciError::config("boom")));
    assert!(matches!(result, Err(OciError::Config(_))));
    assert_eq!(fake.calls().last().map(String::as_str), Some("rollback"));
    assert!(!driver.in_transaction());
}

#[test]
fn test_nested_transaction_defers_to_outer_scope() {
    let fake = Fake::default();
    let driver = Driver::new(&fake);

    driver
        .transaction(|d| {
            d.transaction(|inner| inner.execute_update("UPDATE t SET a = 1", None))?;
            assert!(d.in_transaction());
            Ok(())
        })
        .unwrap();

    assert_eq!(fake.calls().iter().filter(|c| *c == "commit").count(), 1);
}

impl Fake {
    fn count_frees(&self) -> usize {
        self.calls().iter().filter(|c| *c == "free").count()
    }
}
