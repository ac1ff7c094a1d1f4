//! Explicit driver configuration.
//!
//! A [`DriverConfig`] is built once at startup (from code or TOML) and asked
//! for drivers; nothing is kept in global state.
//!
//! ```ignore
//! let conn = ConnectionConfig::from_env()?.connect(&connector)?;
//! let config = DriverConfig::from_toml_str(r#"
//!     environment = "dev"
//!     dump_max_sql_length = 500
//!
//!     [session]
//!     NLS_SORT = "BINARY_CI"
//! "#)?;
//! let driver = config.create_driver(conn)?;
//! ```

use crate::driver::Driver;
use crate::error::{OciError, OciResult};
use crate::monitor::{DumpHook, NoopHook, QueryHook};
use crate::native::{Connector, NativeConnection};
use crate::session::SessionInit;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Deployment environment. Development and test get the dumping hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Parse leniently: anything unknown is production.
    pub fn parse(value: &str) -> Self {
        match value {
            "dev" | "development" => Environment::Development,
            "test" => Environment::Test,
            _ => Environment::Production,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "dev",
            Environment::Test => "test",
            Environment::Production => "prod",
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value))
    }
}

fn default_charset() -> String {
    "UTF8".to_string()
}

fn default_true() -> bool {
    true
}

/// Credentials and target of a native connection.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionConfig {
    pub user: String,
    pub password: String,
    /// Connect string / TNS alias.
    pub dbname: String,
    #[serde(default = "default_charset")]
    pub charset: String,
}

impl ConnectionConfig {
    pub fn new(
        user: impl Into<String>,
        password: impl Into<String>,
        dbname: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            dbname: dbname.into(),
            charset: default_charset(),
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Read `OCI_USER`, `OCI_PASSWORD`, `OCI_DBNAME` and optionally
    /// `OCI_CHARSET` from the environment.
    pub fn from_env() -> OciResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(get: impl Fn(&str) -> Option<String>) -> OciResult<Self> {
        let required =
            |key: &str| get(key).ok_or_else(|| OciError::config(format!("{key} is not set")));
        let mut config = Self::new(
            required("OCI_USER")?,
            required("OCI_PASSWORD")?,
            required("OCI_DBNAME")?,
        );
        if let Some(charset) = get("OCI_CHARSET") {
            config.charset = charset;
        }
        Ok(config)
    }

    /// Open a connection through `connector`.
    pub fn connect<K: Connector>(&self, connector: &K) -> OciResult<K::Connection> {
        connector
            .connect(&self.user, &self.password, &self.dbname, &self.charset)
            .map_err(|err| {
                tracing::warn!(
                    target: "ocisql.sql",
                    user = %self.user,
                    dbname = %self.dbname,
                    "Connection error: {err}"
                );
                OciError::ConnectFailed {
                    user: self.user.clone(),
                    dbname: self.dbname.clone(),
                    message: err.to_string(),
                }
            })
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("dbname", &self.dbname)
            .field("charset", &self.charset)
            .finish()
    }
}

/// How drivers are assembled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DriverConfig {
    #[serde(default)]
    pub environment: Environment,
    /// Run `ALTER SESSION` on every new driver.
    #[serde(default = "default_true")]
    pub init_session: bool,
    /// Session options overriding or extending the defaults.
    #[serde(default)]
    pub session: BTreeMap<String, String>,
    /// SQL truncation for the development dump.
    #[serde(default)]
    pub dump_max_sql_length: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            init_session: true,
            session: BTreeMap::new(),
            dump_max_sql_length: None,
        }
    }
}

impl DriverConfig {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            ..Self::default()
        }
    }

    pub fn from_toml_str(raw: &str) -> OciResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn with_session_option(mut self, option: impl Into<String>, value: impl Into<String>) -> Self {
        self.session.insert(option.into(), value.into());
        self
    }

    pub fn without_session_init(mut self) -> Self {
        self.init_session = false;
        self
    }

    /// Default session options plus the configured overrides.
    pub fn session_init(&self) -> SessionInit {
        let mut init = SessionInit::new();
        for (option, value) in &self.session {
            init.set(option, value);
        }
        init
    }

    /// The hook for this environment.
    pub fn hook(&self) -> Arc<dyn QueryHook> {
        if !self.environment.is_development() {
            return Arc::new(NoopHook);
        }
        let mut dump = DumpHook::new();
        if let Some(max) = self.dump_max_sql_length {
            dump = dump.max_sql_length(max);
        }
        Arc::new(dump)
    }

    /// Build a driver on `conn` and initialise its session.
    pub fn create_driver<C: NativeConnection>(&self, conn: C) -> OciResult<Driver<C>> {
        let driver = Driver::with_hook_arc(conn, self.hook());
        if self.init_session {
            self.session_init().alter_session(&driver)?;
        }
        tracing::debug!(target: "ocisql.config", environment = %self.environment, "driver created");
        Ok(driver)
    }
}
