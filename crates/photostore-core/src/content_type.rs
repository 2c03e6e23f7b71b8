//! Extension whitelist, content-type table, and filename sanitization.
//!
//! The pipeline accepts exactly four photo extensions. Content types are
//! resolved from the lowercased extension; keys never carry a content type
//! of their own.

/// Accepted photo extensions, lowercased.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["gif", "jpeg", "jpg", "png"];

/// Resolve the MIME type for a lowercased extension.
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Extract the lowercased extension of a filename or object key.
pub fn extension_of(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Resolve the MIME type of a filename or object key from its extension.
pub fn content_type_of(filename: &str) -> Option<&'static str> {
    content_type_for_extension(&extension_of(filename)?)
}

/// Whether a filename carries an accepted photo extension (case-insensitive).
pub fn is_allowed(filename: &str) -> bool {
    content_type_of(filename).is_some()
}

/// Sanitize a user-supplied filename for use inside an object key.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else (including
/// path separators and whitespace) becomes `_`. Leading dots are stripped so
/// a sanitized name can never start a hidden path component.
pub fn sanitize_filename(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    sanitized.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_extensions_case_insensitive() {
        for name in ["a.jpg", "a.JPG", "b.jpeg", "c.PNG", "d.Gif"] {
            assert!(is_allowed(name), "{name} should be accepted");
        }
    }

    #[test]
    fn rejected_extensions() {
        for name in ["a.bmp", "a.tiff", "archive.zip", "noext", "trailing."] {
            assert!(!is_allowed(name), "{name} should be rejected");
        }
    }

    #[test]
    fn content_type_table() {
        assert_eq!(content_type_of("x.jpg"), Some("image/jpeg"));
        assert_eq!(content_type_of("x.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_of("x.png"), Some("image/png"));
        assert_eq!(content_type_of("x.gif"), Some("image/gif"));
        assert_eq!(content_type_of("x.webp"), None);
    }

    #[test]
    fn sanitize_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("C:\\temp\\cat.jpg"), "cat.jpg");
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
    }
}
