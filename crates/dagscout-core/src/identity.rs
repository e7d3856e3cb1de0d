//! Node identity
//!
//! IMPORTANT: ids are derived from a 32-bit non-cryptographic hash and are
//! consumed by renderers as graph identifiers. Collisions are possible and
//! intentionally not detected: colliding (file, key) pairs merge into one node.

/// Separator between the file path and the logical name in the hashed key
const KEY_SEPARATOR: &str = "::";

/// Prefix that keeps ids valid identifiers for downstream renderers
const ID_PREFIX: char = 'n';

/// Derive the node id for a logical name defined in `file`
///
/// Always succeeds, including for empty strings.
pub fn identity(file: &str, key: &str) -> String {
    let hash = hash_code(&format!("{}{}{}", file, KEY_SEPARATOR, key));
    format!("{}{}", ID_PREFIX, hash.unsigned_abs())
}

/// 31-multiplier string hash over UTF-16 code units with 32-bit wrapping
fn hash_code(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
