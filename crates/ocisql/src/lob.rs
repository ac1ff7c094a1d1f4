//! Native LOB descriptors and scoped release.
//!
//! A LOB descriptor allocated by [`ParameterBinder::add_large_object`] is handed
//! to the caller, not tracked by the driver. Wrap it in a [`LobGuard`] at the
//! call site so it is closed and freed on every exit path:
//!
//! ```ignore
//! let mut bind = ParameterBinder::new();
//! bind.add_large_object(driver.connection(), ":DOC", None)?;
//! let doc = bind.lob_guard(":DOC")?;
//!
//! let stmt = driver.execute_query("BEGIN load_doc(:DOC); END;", Some(&mut bind))?;
//! let bytes = doc.load()?;
//! stmt.free();
//! doc.release()?;
//! ```
//!
//! [`ParameterBinder::add_large_object`]: crate::param::ParameterBinder::add_large_object

use crate::error::{OciError, OciResult};
use crate::native::NativeLob;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

struct LobInner {
    lob: Box<dyn NativeLob>,
    written: AtomicBool,
    closed: AtomicBool,
    freed: AtomicBool,
}

/// Shared handle on a native LOB descriptor.
///
/// Cloning shares the descriptor. `close` and `free` are idempotent across all
/// clones, so the descriptor is released at most once.
#[derive(Clone)]
pub struct LobHandle {
    inner: Arc<LobInner>,
}

impl LobHandle {
    pub fn new(lob: impl NativeLob + 'static) -> Self {
        Self {
            inner: Arc::new(LobInner {
                lob: Box::new(lob),
                written: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                freed: AtomicBool::new(false),
            }),
        }
    }

    fn ensure_live(&self) -> OciResult<()> {
        if self.is_freed() {
            return Err(OciError::lob("descriptor already freed"));
        }
        Ok(())
    }

    /// Write `data` into a temporary LOB.
    pub fn write_temporary(&self, data: &[u8]) -> OciResult<()> {
        self.ensure_live()?;
        self.inner
            .lob
            .write_temporary(data)
            .map_err(|e| OciError::lob(e.to_string()))?;
        self.inner.written.store(true, Ordering::Release);
        Ok(())
    }

    /// Replace the LOB contents.
    pub fn save(&self, data: &[u8]) -> OciResult<()> {
        self.ensure_live()?;
        self.inner
            .lob
            .save(data)
            .map_err(|e| OciError::lob(e.to_string()))?;
        self.inner.written.store(true, Ordering::Release);
        Ok(())
    }

    /// Read the whole LOB.
    pub fn load(&self) -> OciResult<Vec<u8>> {
        self.ensure_live()?;
        self.inner
            .lob
            .load()
            .map_err(|e| OciError::lob(e.to_string()))
    }

    /// Read the whole LOB as UTF-8 text (CLOB).
    pub fn load_string(&self) -> OciResult<String> {
        String::from_utf8(self.load()?).map_err(|e| OciError::lob(e.to_string()))
    }

    /// Close the LOB. Only needed after writing; a no-op the second time.
    pub fn close(&self) -> OciResult<()> {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner
            .lob
            .close()
            .map_err(|e| OciError::lob(e.to_string()))
    }

    /// Free the descriptor. A no-op the second time.
    pub fn free(&self) -> OciResult<()> {
        if self.inner.freed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner
            .lob
            .free()
            .map_err(|e| OciError::lob(e.to_string()))
    }

    pub fn was_written(&self) -> bool {
        self.inner.written.load(Ordering::Acquire)
    }

    pub fn is_freed(&self) -> bool {
        self.inner.freed.load(Ordering::Acquire)
    }

    /// Whether both handles share the same descriptor.
    pub fn ptr_eq(&self, other: &LobHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for LobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LobHandle")
            .field("written", &self.was_written())
            .field("freed", &self.is_freed())
            .finish()
    }
}

/// Scoped owner of a LOB descriptor.
///
/// On drop (or [`release`](LobGuard::release)) the LOB is closed if it was
/// written, then freed. Release the guard after freeing the statement that used
/// the LOB.
#[must_use = "dropping the guard releases the LOB immediately"]
pub struct LobGuard {
    handle: LobHandle,
    released: bool,
}

impl LobGuard {
    pub fn new(handle: LobHandle) -> Self {
        Self {
            handle,
            released: false,
        }
    }

    pub fn handle(&self) -> &LobHandle {
        &self.handle
    }

    pub fn load(&self) -> OciResult<Vec<u8>> {
        self.handle.load()
    }

    pub fn load_string(&self) -> OciResult<String> {
        self.handle.load_string()
    }

    /// Close (if written) and free now, reporting native failures.
    pub fn release(mut self) -> OciResult<()> {
        self.released = true;
        Self::release_handle(&self.handle)
    }

    fn release_handle(handle: &LobHandle) -> OciResult<()> {
        let closed = if handle.was_written() {
            handle.close()
        } else {
            Ok(())
        };
        let freed = handle.free();
        closed.and(freed)
    }
}

impl Drop for LobGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = Self::release_handle(&self.handle) {
            tracing::warn!(target: "ocisql.lob", error = %err, "failed to release LOB");
        }
    }
}

impl fmt::Debug for LobGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LobGuard")
            .field("handle", &self.handle)
            .field("released", &self.released)
            .finish()
    }
}
