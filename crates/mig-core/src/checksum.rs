//! MD5 checksum utility for change detection.

use md5::{Digest, Md5};

/// Compute the MD5 checksum of raw bytes as lowercase hex
pub fn compute_checksum(bytes: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(compute_checksum(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            compute_checksum(b"select 1;\n"),
            compute_checksum("select 1;\n".as_bytes())
        );
    }

    #[test]
    fn test_digest_is_128_bit_hex() {
        let sum = compute_checksum(b"CREATE TABLE t (id int);");
        assert_eq!(sum.len(), 32);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
