/// Extension of the chapter archive.
pub const ARCHIVE_EXTENSION: &str = "cbz";

/// Extension used when an image address has none.
const FALLBACK_IMAGE_EXTENSION: &str = "jpg";

/// Filesystem-safe archive name: `{sanitized_chapter_name}.cbz`
pub fn archive_filename(chapter_name: &str) -> String {
    format!("{}.{ARCHIVE_EXTENSION}", sanitize_component(chapter_name))
}

/// Archive entry name: `{page_name}.{ext}` with `ext` taken from the image address.
pub fn entry_name(page_name: &str, image_url: &str) -> String {
    format!(
        "{}.{}",
        sanitize_component(page_name),
        image_extension(image_url)
    )
}

/// Last `.` segment of the address path, ignoring any query string or fragment.
pub fn image_extension(image_url: &str) -> String {
    let path = image_url
        .split(['?', '#'])
        .next()
        .unwrap_or(image_url);
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            ext.to_ascii_lowercase()
        }
        _ => FALLBACK_IMAGE_EXTENSION.to_string(),
    }
}

fn sanitize_component(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let mut cleaned = cleaned.trim_matches(&[' ', '.'][..]).to_string();
    if cleaned.is_empty() {
        cleaned = "untitled".to_string();
    }
    if is_reserved_windows_name(&cleaned) {
        cleaned.push('_');
    }
    cleaned
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}

fn is_reserved_windows_name(name: &str) -> bool {
    const RESERVED: &[&str] = &[
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
        "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ];
    RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name))
}
