use std::collections::HashMap;
use std::path::Path;

/// Filenames the operator never wants downloaded.
///
/// One name per line; blank lines and `#` comments are skipped. Matching is
/// case-insensitive and reports the entry as written in the file.
#[derive(Debug, Default)]
pub struct IgnoreList {
    entries: HashMap<String, String>,
}

impl IgnoreList {
    pub fn parse(contents: &str) -> Self {
        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| (line.to_lowercase(), line.to_string()))
            .collect();
        Self { entries }
    }

    /// Load the list at `path`. A missing file is created empty when
    /// `create_missing` is set. Read or create failures are logged and
    /// produce an empty list.
    pub async fn load_or_create(path: &Path, create_missing: bool) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let list = Self::parse(&contents);
                if !list.is_empty() {
                    tracing::info!("Loaded {} file(s) from ignore list", list.len());
                }
                list
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if create_missing {
                    match tokio::fs::write(path, b"").await {
                        Ok(()) => {
                            tracing::info!("Created empty ignore list at {}", path.display())
                        }
                        Err(e) => tracing::warn!(
                            "Could not create ignore list {}: {}",
                            path.display(),
                            e
                        ),
                    }
                }
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Could not read ignore list {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// The ignore-list entry matching `filename`, as written in the file.
    pub fn matched(&self, filename: &str) -> Option<&str> {
        self.entries
            .get(&filename.to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let list = IgnoreList::parse("# header\n\n  Song A.mp3  \n#Song B.mp3\nvoice_1.ogg\n");
        assert_eq!(list.len(), 2);
        assert_eq!(list.matched("Song A.mp3"), Some("Song A.mp3"));
        assert_eq!(list.matched("Song B.mp3"), None);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let list = IgnoreList::parse("Loud Track.MP3\n");
        assert_eq!(list.matched("loud track.mp3"), Some("Loud Track.MP3"));
        assert_eq!(list.matched("LOUD TRACK.MP3"), Some("Loud Track.MP3"));
        assert_eq!(list.matched("other.mp3"), None);
    }

    #[tokio::test]
    async fn test_load_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore_list.txt");
        let list = IgnoreList::load_or_create(&path, true).await;
        assert!(list.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_load_does_not_create_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore_list.txt");
        let list = IgnoreList::load_or_create(&path, false).await;
        assert!(list.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ignore_list.txt");
        std::fs::write(&path, "a.mp3\nB.flac\n").unwrap();
        let list = IgnoreList::load_or_create(&path, true).await;
        assert_eq!(list.len(), 2);
        assert_eq!(list.matched("b.FLAC"), Some("B.flac"));
    }
}
