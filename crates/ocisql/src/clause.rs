//! IN-list expansion into numbered placeholders.

use crate::error::{OciError, OciResult};
use crate::param::ParameterBinder;
use crate::value::BindValue;

/// Oracle rejects IN lists with more than 999 expressions (ORA-01795).
pub const MAX_IN_LIST_VALUES: usize = 999;

/// Bind `values` as `prefix1, prefix2, ...` and return the placeholder list.
///
/// ```ignore
/// let mut bind = ParameterBinder::new();
/// let keys = expand_in_list([1, 2, 3], ":ID", &mut bind)?; // ":ID1, :ID2, :ID3"
/// let sql = format!("SELECT * FROM users WHERE id IN ({keys})");
/// let rows = driver.fetch_all_rows(&sql, Some(&mut bind))?;
/// ```
pub fn expand_in_list<I>(values: I, prefix: &str, binder: &mut ParameterBinder) -> OciResult<String>
where
    I: IntoIterator,
    I::Item: Into<BindValue>,
{
    let values: Vec<BindValue> = values.into_iter().map(Into::into).collect();
    if values.len() > MAX_IN_LIST_VALUES {
        return Err(OciError::TooManyValues {
            count: values.len(),
            max: MAX_IN_LIST_VALUES,
        });
    }

    let mut keys = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        let key = format!("{prefix}{}", i + 1);
        binder.add(&key, value)?;
        keys.push(key);
    }

    Ok(keys.join(", "))
}
