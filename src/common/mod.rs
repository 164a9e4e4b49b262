use std::path::Path;

pub mod lru;

/// File extensions treated as images by the file and wallpaper views.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg", "ico", "xpm", "pbm", "pgm",
    "ppm",
];

pub fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&s[prefix.len()..]),
        _ => None,
    }
}

/// Case-insensitive substring test. `needle` must already be lower-case.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}

/// Lower-cased extension of `path`, if any.
pub fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_image_path(path: &Path) -> bool {
    extension_lower(path)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_ignores_case() {
        assert_eq!(strip_prefix_ci("WALL:sky", "wall:"), Some("sky"));
        assert_eq!(strip_prefix_ci("wal", "wall:"), None);
        assert_eq!(strip_prefix_ci("é", "e"), None);
    }

    #[test]
    fn image_detection_uses_extension() {
        assert!(is_image_path(Path::new("/tmp/a.JPG")));
        assert!(is_image_path(Path::new("b.webp")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("png")));
    }
}
