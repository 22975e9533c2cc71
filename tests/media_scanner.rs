use std::fs;
use std::path::PathBuf;

use simpleaudio::media::scanner::{scan, sort_by_file_name};

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn scan_nonexistent_root_returns_empty_playlist() {
    let playlist = scan(&PathBuf::from("/nonexistent/path/does/not/exist"));
    assert!(playlist.is_empty());
}

#[test]
fn scan_keeps_only_audio_and_sorts_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.MP3"), b"x").unwrap();
    fs::write(dir.path().join("A.ogg"), b"x").unwrap();
    fs::write(dir.path().join("c.flac"), b"x").unwrap();
    fs::write(dir.path().join("cover.jpg"), b"x").unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();

    let playlist = scan(dir.path());
    assert_eq!(playlist.len(), 3);
    assert_eq!(names(playlist.paths()), vec!["A.ogg", "b.MP3", "c.flac"]);
}

#[test]
fn scan_recurses_and_orders_by_file_name_not_path() {
    let dir = tempfile::tempdir().unwrap();
    let deep = dir.path().join("a-artist").join("album");
    fs::create_dir_all(&deep).unwrap();
    fs::write(deep.join("Zulu.wav"), b"x").unwrap();
    fs::write(dir.path().join("alpha.m4a"), b"x").unwrap();
    let z = dir.path().join("z-dir");
    fs::create_dir_all(&z).unwrap();
    fs::write(z.join("Bravo.opus"), b"x").unwrap();

    let playlist = scan(dir.path());
    assert_eq!(names(playlist.paths()), vec!["alpha.m4a", "Bravo.opus", "Zulu.wav"]);
    assert!(playlist.paths().iter().all(|p| p.is_absolute()));
}

#[test]
fn scan_excludes_directories_with_audio_extensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("folder.mp3")).unwrap();
    fs::write(dir.path().join("real.mp3"), b"x").unwrap();

    let playlist = scan(dir.path());
    assert_eq!(names(playlist.paths()), vec!["real.mp3"]);
}

#[cfg(unix)]
#[test]
fn scan_does_not_descend_into_directory_symlinks() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("elsewhere.mp3"), b"x").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("linked")).unwrap();
    fs::write(dir.path().join("here.mp3"), b"x").unwrap();

    let playlist = scan(dir.path());
    assert_eq!(names(playlist.paths()), vec!["here.mp3"]);
}

#[test]
fn sort_by_file_name_breaks_ties_by_path() {
    let mut paths = vec![
        PathBuf::from("/lib/b/Song.mp3"),
        PathBuf::from("/lib/a/song.mp3"),
        PathBuf::from("/lib/Intro.mp3"),
    ];
    sort_by_file_name(&mut paths);
    assert_eq!(
        paths,
        vec![
            PathBuf::from("/lib/Intro.mp3"),
            PathBuf::from("/lib/a/song.mp3"),
            PathBuf::from("/lib/b/Song.mp3"),
        ]
    );
}
