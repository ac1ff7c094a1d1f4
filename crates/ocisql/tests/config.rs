//! Driver assembly from configuration, connection and session init.

mod common;

use common::{FakeConnector, ScriptedConn};
use ocisql::session::SessionInit;
use ocisql::{ConnectionConfig, DriverConfig, Environment, OciError};

const DEFAULT_ALTER_SESSION: &str = "ALTER SESSION SET NLS_TIME_FORMAT='HH24:MI:SS' \
    NLS_DATE_FORMAT='YYYY-MM-DD HH24:MI:SS' \
    NLS_TIMESTAMP_FORMAT='YYYY-MM-DD HH24:MI:SS' \
    NLS_TIMESTAMP_TZ_FORMAT='YYYY-MM-DD HH24:MI:SS TZH:TZM' \
    NLS_NUMERIC_CHARACTERS='.,'";

#[test]
fn create_driver_initialises_session() {
    let conn = ScriptedConn::new();
    let driver = DriverConfig::new(Environment::Production)
        .create_driver(&conn)
        .unwrap();

    assert_eq!(
        conn.calls(),
        [
            format!("prepare {DEFAULT_ALTER_SESSION}"),
            "execute CommitOnSuccess".to_string(),
            "free".to_string(),
        ]
    );
    assert!(!driver.in_transaction());
}

#[test]
fn create_driver_with_session_override() {
    let conn = ScriptedConn::new();
    DriverConfig::new(Environment::Test)
        .with_session_option("NLS_DATE_FORMAT", "DD/MM/YYYY")
        .create_driver(&conn)
        .unwrap();

    let prepare = &conn.calls()[0];
    assert!(prepare.contains("NLS_DATE_FORMAT='DD/MM/YYYY'"));
    assert!(!prepare.contains("NLS_DATE_FORMAT='YYYY-MM-DD HH24:MI:SS'"));
}

#[test]
fn create_driver_without_session_init() {
    let conn = ScriptedConn::new();
    DriverConfig::default()
        .without_session_init()
        .create_driver(&conn)
        .unwrap();
    assert!(conn.calls().is_empty());
}

#[test]
fn create_driver_fails_when_session_init_fails() {
    let conn = ScriptedConn::new();
    conn.failing(DEFAULT_ALTER_SESSION, 2248, "invalid option for ALTER SESSION");

    let err = DriverConfig::default().create_driver(&conn).unwrap_err();
    assert!(err.is_query_failed());
}

#[test]
fn alter_session_reports_row_count() {
    let conn = ScriptedConn::new();
    let driver = DriverConfig::default()
        .without_session_init()
        .create_driver(&conn)
        .unwrap();

    assert!(!SessionInit::new().alter_session(&driver).unwrap());
    conn.affecting(DEFAULT_ALTER_SESSION, 1);
    assert!(SessionInit::new().alter_session(&driver).unwrap());
}

#[test]
fn connect_through_connector() {
    let connector = FakeConnector {
        user: "scott".into(),
        password: "tiger".into(),
    };

    let ok = ConnectionConfig::new("scott", "tiger", "XE").connect(&connector);
    assert!(ok.is_ok());

    let Err(err) = ConnectionConfig::new("scott", "wrong", "XE").connect(&connector) else {
        panic!("wrong password accepted");
    };
    match err {
        OciError::ConnectFailed {
            user,
            dbname,
            message,
        } => {
            assert_eq!(user, "scott");
            assert_eq!(dbname, "XE");
            assert!(message.starts_with("ORA-01017"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
