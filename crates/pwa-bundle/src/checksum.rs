//! Checksum of the active extension set.

use md5::{Digest, Md5};

use crate::extension::ExtensionMetadata;
use crate::util::to_php_json;
use crate::Result;

/// Compute the identifier of an ordered extension list.
///
/// The list is encoded as a JSON array of `{"name", "path"}` objects with
/// PHP escaping and hashed with MD5. The hex digest is used verbatim as the
/// published artifact's base name.
pub fn compute_checksum(extensions: &[ExtensionMetadata]) -> Result<String> {
    let encoded = to_php_json(extensions)?;
    Ok(md5_hex(encoded.as_bytes()))
}

/// Lowercase hex MD5 of `data`
pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
