//! Path building and recognition of 3-level hash-bucket paths.

use std::path::MAIN_SEPARATOR;

/// Join path segments into a separator-prefixed string, collapsing
/// duplicate separators. Empty segments are skipped.
pub fn build_path(segments: &[&str]) -> String {
    let mut path = String::new();
    for segment in segments {
        let trimmed = segment.trim_matches(['/', '\\']);
        if trimmed.is_empty() {
            continue;
        }
        path.push(MAIN_SEPARATOR);
        path.push_str(trimmed);
    }
    path
}

/// Check whether the path contains a hash-bucket run `xx/yy/zz/`:
/// three consecutive 2-character alphanumeric components that are
/// followed by a further component or a trailing separator.
pub fn is_hash_path(path: &str) -> bool {
    hash_path_segments(path).is_some()
}

/// Extract the three hash-bucket components of a path, if present.
pub fn hash_path_segments(path: &str) -> Option<[String; 3]> {
    let is_sep = |c: char| c == '/' || c == '\\';
    let components: Vec<&str> = path.split(is_sep).collect();
    // The last split entry is "" when the path ends with a separator;
    // a trailing separator after the run is required, same as a deeper
    // component.
    for window in components.windows(4) {
        if window[..3].iter().all(|c| is_bucket(c)) {
            return Some([
                window[0].to_owned(),
                window[1].to_owned(),
                window[2].to_owned(),
            ]);
        }
    }
    None
}

fn is_bucket(component: &str) -> bool {
    component.len() == 2 && component.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Find the first category suffix in a path: an underscore followed by
/// exactly three ASCII letters, e.g. `"_abc"` in `"media_abc"`.
pub fn category_dir_suffix(path: &str) -> Option<&str> {
    let bytes = path.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            continue;
        }
        if bytes[i + 1..].len() >= 3 && bytes[i + 1..i + 4].iter().all(u8::is_ascii_alphabetic) {
            return Some(&path[i..i + 4]);
        }
    }
    None
}
