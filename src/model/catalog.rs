//! Track catalog backed by the music directory

use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use super::Track;

/// Extensions the audio backend can decode, in resolve probe order.
const PLAYABLE_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg"];

/// Read-only view over the directory of playable files.
///
/// Nothing is cached: `resolve` probes the filesystem per call and
/// `list_all` re-scans the directory, so files added or removed while the
/// cabinet is up are picked up on the next lookup or shuffle cycle.
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    music_dir: PathBuf,
}

impl TrackCatalog {
    pub fn new(music_dir: PathBuf) -> Self {
        Self { music_dir }
    }

    /// Look up a selection token. `None` means no playable file carries
    /// that name right now; that is user feedback, not an error.
    pub fn resolve(&self, token: &str) -> Option<Track> {
        for ext in PLAYABLE_EXTENSIONS {
            let path = self.music_dir.join(format!("{token}.{ext}"));
            if path.is_file() {
                return Some(Track {
                    id: token.to_string(),
                    path,
                });
            }
        }
        None
    }

    /// Enumerate every playable track, freshly scanned. May be empty.
    pub fn list_all(&self) -> Vec<Track> {
        let entries = match fs::read_dir(&self.music_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    dir = %self.music_dir.display(),
                    error = %e,
                    "cannot scan music directory"
                );
                return Vec::new();
            }
        };

        let mut tracks = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(ext) = path.extension().and_then(OsStr::to_str) else {
                continue;
            };
            if !PLAYABLE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            tracks.push(Track {
                id: stem.to_string(),
                path,
            });
        }

        // Stable order; the shuffle layer randomizes on top of this.
        tracks.sort_by(|a, b| a.id.cmp(&b.id));
        tracks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn music_dir(names: &[&str]) -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        for name in names {
            File::create(dir.path().join(name)).expect("touch file");
        }
        dir
    }

    #[test]
    fn resolves_existing_track() {
        let dir = music_dir(&["A1.mp3", "B2.mp3"]);
        let catalog = TrackCatalog::new(dir.path().to_path_buf());

        let track = catalog.resolve("A1").expect("A1 should resolve");
        assert_eq!(track.id, "A1");
        assert_eq!(track.path, dir.path().join("A1.mp3"));
    }

    #[test]
    fn resolve_misses_unknown_token() {
        let dir = music_dir(&["A1.mp3"]);
        let catalog = TrackCatalog::new(dir.path().to_path_buf());
        assert!(catalog.resolve("Z9").is_none());
    }

    #[test]
    fn resolve_probes_all_playable_extensions() {
        let dir = music_dir(&["C3.flac"]);
        let catalog = TrackCatalog::new(dir.path().to_path_buf());

        let track = catalog.resolve("C3").expect("flac should resolve");
        assert_eq!(track.path, dir.path().join("C3.flac"));
    }

    #[test]
    fn list_all_skips_non_audio_files() {
        let dir = music_dir(&["A1.mp3", "B2.wav", "notes.txt", "cover.png"]);
        let catalog = TrackCatalog::new(dir.path().to_path_buf());

        let ids: Vec<String> = catalog.list_all().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["A1", "B2"]);
    }

    #[test]
    fn list_all_sees_files_added_after_startup() {
        let dir = music_dir(&["A1.mp3"]);
        let catalog = TrackCatalog::new(dir.path().to_path_buf());
        assert_eq!(catalog.list_all().len(), 1);

        File::create(dir.path().join("B2.mp3")).expect("touch file");
        assert_eq!(catalog.list_all().len(), 2);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let catalog = TrackCatalog::new(PathBuf::from("/nonexistent/jukebox-music"));
        assert!(catalog.list_all().is_empty());
        assert!(catalog.resolve("A1").is_none());
    }
}
