//! Random `object_id` tags stamped onto records at creation.

use rand::{RngCore, rngs::OsRng};

/// Hex length used when no other length is configured.
pub const DEFAULT_OBJECT_ID_LEN: usize = 16;

/// Check that `len` hex characters can be produced from whole bytes.
pub fn validate_len(len: usize) -> Result<(), String> {
    if len < 2 || len % 2 != 0 {
        return Err(format!(
            "object id length must be an even number >= 2, got {len}"
        ));
    }
    Ok(())
}

/// Generate `0x` followed by `len` lowercase hex characters.
///
/// Draws `len / 2` bytes from the operating system CSPRNG. `len` must have
/// passed [`validate_len`]; an odd length is rounded down.
pub fn generate(len: usize) -> String {
    let mut bytes = vec![0u8; len / 2];
    OsRng.fill_bytes(&mut bytes);

    let hex = bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>();
    format!("0x{}", hex)
}
