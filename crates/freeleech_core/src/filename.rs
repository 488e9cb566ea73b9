pub const TORRENT_EXTENSION: &str = ".torrent";

/// Longest stem kept from a title, in characters.
pub const MAX_STEM_CHARS: usize = 200;

/// Filesystem-safe file name for a payload: forbidden characters become `_`,
/// the stem is cut to [`MAX_STEM_CHARS`], and `.torrent` is appended unless the
/// title already ends with it.
pub fn torrent_filename(title: &str) -> String {
    let mut stem = sanitize_stem(title);
    if stem.trim().is_empty() {
        stem = "untitled".to_string();
    }
    if stem.ends_with(TORRENT_EXTENSION) {
        stem
    } else {
        format!("{stem}{TORRENT_EXTENSION}")
    }
}

/// Replace every forbidden path character with `_` and cut to [`MAX_STEM_CHARS`].
pub fn sanitize_stem(input: &str) -> String {
    input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .take(MAX_STEM_CHARS)
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}'
    )
}
