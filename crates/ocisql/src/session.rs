//! Session initialisation (`ALTER SESSION`).

use crate::driver::Driver;
use crate::error::OciResult;
use crate::format;
use crate::native::NativeConnection;

/// Options applied to every new session, in order.
pub const DEFAULT_SESSION_OPTIONS: [(&str, &str); 5] = [
    ("NLS_TIME_FORMAT", format::NLS_TIME),
    ("NLS_DATE_FORMAT", format::NLS_DATE),
    ("NLS_TIMESTAMP_FORMAT", format::NLS_TIMESTAMP),
    ("NLS_TIMESTAMP_TZ_FORMAT", format::NLS_TIMESTAMP_TZ),
    ("NLS_NUMERIC_CHARACTERS", format::NLS_NUMERIC_CHARACTERS),
];

/// Builds and runs the `ALTER SESSION SET ...` statement.
///
/// The defaults make dates, timestamps and numbers round-trip as the text
/// produced by [`BindValue`](crate::BindValue)'s conversions.
///
/// ```ignore
/// SessionInit::new()
///     .set("NLS_SORT", "BINARY_CI")
///     .alter_session(&driver)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInit {
    options: Vec<(String, String)>,
}

impl Default for SessionInit {
    fn default() -> Self {
        Self {
            options: DEFAULT_SESSION_OPTIONS
                .iter()
                .map(|&(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl SessionInit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override an option, or append it when it is not set yet.
    pub fn set(&mut self, option: &str, value: &str) -> &mut Self {
        match self
            .options
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(option))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => self.options.push((option.to_string(), value.to_string())),
        }
        self
    }

    pub fn options(&self) -> &[(String, String)] {
        &self.options
    }

    /// `ALTER SESSION SET OPT1='v1' OPT2='v2' ...`
    pub fn to_sql(&self) -> String {
        let vars: Vec<String> = self
            .options
            .iter()
            .map(|(option, value)| format!("{option}='{value}'"))
            .collect();
        format!("ALTER SESSION SET {}", vars.join(" "))
    }

    /// Run the statement; true when the native row count is non-zero.
    pub fn alter_session<C: NativeConnection>(&self, driver: &Driver<C>) -> OciResult<bool> {
        let count = driver.execute_update(&self.to_sql(), None)?;
        tracing::debug!(target: "ocisql.session", options = self.options.len(), "session altered");
        Ok(count != 0)
    }
}
