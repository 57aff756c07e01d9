use sha2::{Digest, Sha256};

/// Postgres truncates identifiers beyond this many bytes.
const MAX_IDENTIFIER_BYTES: usize = 63;
const HASH_CHARS: usize = 8;

/// Schema name owned by `processor` for one drive.
///
/// The readable part is the drive id lowercased with every character outside
/// `[a-z0-9_]` replaced by `_`. Sanitizing is lossy, so an 8-hex-char
/// SHA-256 prefix of the raw drive id is appended; distinct drive ids map to
/// distinct namespaces. The result always fits in a Postgres identifier.
pub fn namespace(processor: &str, drive_id: &str) -> String {
    let digest = hex::encode(Sha256::digest(drive_id.as_bytes()));
    let suffix = &digest[..HASH_CHARS];

    let mut head = sanitize(processor);
    let drive = sanitize(drive_id);
    if !drive.is_empty() {
        head.push('_');
        head.push_str(&drive);
    }
    if head.is_empty() || head.starts_with(|c: char| c.is_ascii_digit()) {
        head.insert(0, '_');
    }

    // The hash suffix is never truncated; only the readable head is.
    head.truncate(MAX_IDENTIFIER_BYTES - HASH_CHARS - 1);
    format!("{head}_{suffix}")
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_identifier(name: &str) -> bool {
        name.len() <= MAX_IDENTIFIER_BYTES
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn deterministic() {
        assert_eq!(
            namespace("workstreams", "powerhouse"),
            namespace("workstreams", "powerhouse")
        );
    }

    #[test]
    fn sanitized_and_suffixed() {
        let ns = namespace("workstreams", "My-Drive.01");
        assert!(ns.starts_with("workstreams_my_drive_01_"));
        assert_eq!(ns.len(), "workstreams_my_drive_01_".len() + HASH_CHARS);
        assert!(is_valid_identifier(&ns));
    }

    #[test]
    fn ids_that_sanitize_alike_stay_distinct() {
        let a = namespace("workstreams", "drive-a");
        let b = namespace("workstreams", "drive.a");
        let c = namespace("workstreams", "DRIVE_A");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn long_and_odd_ids_remain_valid_identifiers() {
        let long = "x".repeat(200);
        for id in [long.as_str(), "", "ünïcødé drive", "42"] {
            let ns = namespace("workstreams", id);
            assert!(is_valid_identifier(&ns), "{ns}");
        }
        assert!(is_valid_identifier(&namespace("9lives", "drive")));
    }

    #[test]
    fn long_processor_keeps_the_full_hash_suffix() {
        let processor = "p".repeat(60);
        let a = namespace(&processor, "drive-a");
        let b = namespace(&processor, "drive.a");

        for ns in [&a, &b] {
            assert!(is_valid_identifier(ns), "{ns}");
            let suffix = ns.rsplit('_').next().unwrap();
            assert_eq!(suffix.len(), HASH_CHARS);
        }
        assert_ne!(a, b);
    }
}
