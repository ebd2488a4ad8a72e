use std::path::{Path, PathBuf};

/// Characters that are invalid in filenames on at least one common filesystem.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replace filesystem-invalid characters with `_`, then trim leading and
/// trailing spaces and dots.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '_' } else { c })
        .collect();
    replaced.trim_matches(|c| c == ' ' || c == '.').to_string()
}

/// Sanitize an item filename, falling back to an id-based name when nothing
/// usable is left (e.g. a file literally named `"..."`), so the result never
/// points at the channel directory itself.
pub fn item_filename(raw: &str, message_id: i32) -> String {
    let clean = sanitize_filename(raw);
    if clean.is_empty() {
        format!("audio_{}", message_id)
    } else {
        clean
    }
}

/// Per-channel download directory: `base/<sanitized title>`, or `base/<id>`
/// when the title sanitizes to nothing.
pub fn channel_directory(base: &Path, title: &str, channel_id: i64) -> PathBuf {
    let clean = sanitize_filename(title);
    if clean.is_empty() {
        base.join(channel_id.to_string())
    } else {
        base.join(clean)
    }
}

/// Temporary path a download is streamed into before being renamed into place.
pub fn part_path(download_path: &Path) -> PathBuf {
    let mut name = download_path.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_replaces_invalid_chars() {
        assert_eq!(sanitize_filename("AC/DC: Back?.mp3"), "AC_DC_ Back_.mp3");
        assert_eq!(sanitize_filename("a<b>c\"d\\e|f*g"), "a_b_c_d_e_f_g");
        assert_eq!(sanitize_filename("normal.mp3"), "normal.mp3");
    }

    #[test]
    fn test_sanitize_filename_trims_spaces_and_dots() {
        assert_eq!(sanitize_filename("  song.mp3  "), "song.mp3");
        assert_eq!(sanitize_filename("..hidden.mp3."), "hidden.mp3");
        assert_eq!(sanitize_filename(" . "), "");
    }

    #[test]
    fn test_sanitize_filename_keeps_unicode() {
        assert_eq!(sanitize_filename("Мелодия – Ё.mp3"), "Мелодия – Ё.mp3");
    }

    #[test]
    fn test_item_filename_fallback() {
        assert_eq!(item_filename("song.mp3", 9), "song.mp3");
        assert_eq!(item_filename("...", 9), "audio_9");
        assert_eq!(item_filename(" . . ", 9), "audio_9");
        assert_eq!(item_filename(" .mp3", 9), "mp3");
    }

    #[test]
    fn test_channel_directory() {
        let base = Path::new("/tmp/dl");
        assert_eq!(
            channel_directory(base, "Jazz: Live/Studio", 1),
            PathBuf::from("/tmp/dl/Jazz_ Live_Studio")
        );
        assert_eq!(channel_directory(base, "...", 12345), PathBuf::from("/tmp/dl/12345"));
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/tmp/dl/song.mp3")),
            PathBuf::from("/tmp/dl/song.mp3.part")
        );
    }
}
