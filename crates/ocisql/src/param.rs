//! Named bind parameters.

use crate::error::{OciError, OciResult};
use crate::lob::{LobGuard, LobHandle};
use crate::native::NativeConnection;
use crate::value::BindValue;
use serde::Serialize;
use std::collections::HashMap;

/// Leading character of every named placeholder.
pub const BIND_MARKER: char = ':';

/// Max length meaning "use the value's natural length".
pub const DEFAULT_MAX_LEN: i64 = -1;

/// How a placeholder is bound natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BindKind {
    /// Character data (`SQLT_CHR`), used for all scalars.
    Text,
    /// `LONG RAW` data (`SQLT_LBI`).
    LongRaw,
    /// LOB descriptor (`OCI_B_CLOB`).
    LargeObject,
}

/// One bound placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct BindDescriptor {
    pub name: String,
    pub value: BindValue,
    pub max_length: i64,
    pub kind: BindKind,
}

impl BindDescriptor {
    /// An explicit max length marks the placeholder as an output bind.
    pub fn is_output(&self) -> bool {
        self.max_length >= 0
    }
}

/// Check placeholder syntax: the bind marker followed by an identifier.
pub fn is_valid_bind_name(name: &str) -> bool {
    let Some(ident) = name.strip_prefix(BIND_MARKER) else {
        return false;
    };
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '$' | '#'))
}

/// Named placeholder → bind descriptor map.
///
/// Re-adding a name overwrites the previous descriptor in place, so
/// [`descriptors`](Self::descriptors) keeps first-insertion order.
///
/// ```ignore
/// let mut bind = ParameterBinder::new();
/// bind.add(":ID", 42)?.add(":NAME", "O'neil")?;
/// driver.fetch_all_rows("SELECT * FROM users WHERE id = :ID OR name = :NAME", Some(&mut bind))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParameterBinder {
    binds: Vec<BindDescriptor>,
    index: HashMap<String, usize>,
}

impl ParameterBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a scalar (or `NULL`) as text.
    ///
    /// Floats are rendered with `.` whatever the process locale.
    pub fn add(&mut self, name: &str, value: impl Into<BindValue>) -> OciResult<&mut Self> {
        self.add_with_length(name, value, DEFAULT_MAX_LEN)
    }

    /// Bind a scalar with an explicit max length.
    ///
    /// Only needed for output binds: a length `>= 0` makes the driver read the
    /// value back after execution.
    pub fn add_with_length(
        &mut self,
        name: &str,
        value: impl Into<BindValue>,
        max_length: i64,
    ) -> OciResult<&mut Self> {
        self.insert(name, value.into(), max_length, BindKind::Text)
    }

    /// Declare an output placeholder, initially `NULL`.
    pub fn add_output(&mut self, name: &str, max_length: i64) -> OciResult<&mut Self> {
        self.insert(name, BindValue::Null, max_length.max(0), BindKind::Text)
    }

    /// Bind raw bytes to a `LONG RAW` column, untouched.
    pub fn add_long_raw(&mut self, name: &str, value: impl Into<Vec<u8>>) -> OciResult<&mut Self> {
        self.insert(
            name,
            BindValue::LongRaw(value.into()),
            DEFAULT_MAX_LEN,
            BindKind::LongRaw,
        )
    }

    /// Allocate a LOB descriptor on `conn` and bind it.
    ///
    /// With `initial_data` the LOB is written as a temporary LOB right away
    /// (write mode); without it the LOB is left empty for the statement to
    /// fill (read mode). The descriptor is not tracked by the driver: take it
    /// back with [`lob_guard`](Self::lob_guard) and release it once the
    /// statement has been freed.
    pub fn add_large_object<C: NativeConnection + ?Sized>(
        &mut self,
        conn: &C,
        name: &str,
        initial_data: Option<&[u8]>,
    ) -> OciResult<&mut Self> {
        ensure_bind_name(name)?;
        let lob = conn.new_lob().map_err(|e| OciError::lob(e.to_string()))?;
        if let Some(data) = initial_data.filter(|d| !d.is_empty()) {
            if let Err(err) = lob.write_temporary(data) {
                if let Err(free_err) = lob.free() {
                    tracing::warn!(
                        target: "ocisql.lob",
                        bind = %name,
                        error = %free_err,
                        "failed to free LOB after write error"
                    );
                }
                return Err(err);
            }
        }
        self.insert(
            name,
            BindValue::Lob(lob),
            DEFAULT_MAX_LEN,
            BindKind::LargeObject,
        )
    }

    fn insert(
        &mut self,
        name: &str,
        value: BindValue,
        max_length: i64,
        kind: BindKind,
    ) -> OciResult<&mut Self> {
        ensure_bind_name(name)?;
        let descriptor = BindDescriptor {
            name: name.to_string(),
            value,
            max_length,
            kind,
        };
        match self.index.get(name) {
            Some(&i) => self.binds[i] = descriptor,
            None => {
                self.index.insert(name.to_string(), self.binds.len());
                self.binds.push(descriptor);
            }
        }
        Ok(self)
    }

    /// Current value of a placeholder (after execution for output binds).
    pub fn get_value(&self, name: &str) -> OciResult<&BindValue> {
        self.get(name).map(|d| &d.value)
    }

    /// Descriptor of a placeholder.
    pub fn get(&self, name: &str) -> OciResult<&BindDescriptor> {
        self.index
            .get(name)
            .map(|&i| &self.binds[i])
            .ok_or_else(|| OciError::UnknownBindName(name.to_string()))
    }

    pub(crate) fn set_value(&mut self, name: &str, value: BindValue) {
        if let Some(&i) = self.index.get(name) {
            self.binds[i].value = value;
        }
    }

    /// LOB descriptor bound under `name`.
    pub fn lob(&self, name: &str) -> OciResult<&LobHandle> {
        self.get_value(name)?
            .as_lob()
            .ok_or_else(|| OciError::lob(format!("{name} is not bound to a LOB")))
    }

    /// Scoped owner for the LOB bound under `name`.
    pub fn lob_guard(&self, name: &str) -> OciResult<LobGuard> {
        self.lob(name).map(|lob| LobGuard::new(lob.clone()))
    }

    /// All descriptors, in first-insertion order.
    pub fn descriptors(&self) -> &[BindDescriptor] {
        &self.binds
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    /// Structural dump used in error diagnostics and debug output.
    pub fn diagnostics(&self) -> serde_json::Value {
        descriptors_to_json(&self.binds)
    }
}

fn ensure_bind_name(name: &str) -> OciResult<()> {
    if is_valid_bind_name(name) {
        Ok(())
    } else {
        Err(OciError::InvalidBindName(name.to_string()))
    }
}

pub(crate) fn descriptors_to_json(binds: &[BindDescriptor]) -> serde_json::Value {
    serde_json::to_value(binds).unwrap_or(serde_json::Value::Null)
}
