//! Multi-key Lookup
//!
//! Point lookups for a list of keys. Missing keys are left out of the
//! result instead of failing the call.

use crate::error::Result;
use crate::store::KvRead;

/// Look up every key in `keys`, in request order.
///
/// Requesting N keys of which M are absent yields N - M pairs. Only engine
/// failures are errors.
pub fn multi_get<S, K>(store: &S, keys: &[K]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>
where
    S: KvRead,
    K: AsRef<[u8]>,
{
    let mut found = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.as_ref();
        if let Some(value) = store.get(key)? {
            found.push((key.to_vec(), value));
        }
    }
    Ok(found)
}
