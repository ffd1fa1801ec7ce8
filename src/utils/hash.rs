//! Content addressing.
//!
//! Output names are the hex md5 of the optimized bytes, so equal content
//! always lands on the same path.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let name = hash::md5_hex(b"body{color:red}"); // -> 32 hex chars
//! let uri = hash::content_uri("css", "css", optimized); // -> "/css/<md5>.css"
//! ```

use md5::{Digest, Md5};

/// Hex-encoded md5 digest of `data`.
#[inline]
pub fn md5_hex<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(Md5::digest(data.as_ref()))
}

/// Content-addressed URI: `/<dir>/<md5(data)>.<ext>`.
pub fn content_uri(dir: &str, ext: &str, data: &[u8]) -> String {
    let dir = dir.trim_matches('/');
    let name = md5_hex(data);
    match (dir.is_empty(), ext.is_empty()) {
        (true, true) => format!("/{name}"),
        (true, false) => format!("/{name}.{ext}"),
        (false, true) => format!("/{dir}/{name}"),
        (false, false) => format!("/{dir}/{name}.{ext}"),
    }
}
