mod common;

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use common::*;
use id3v2::{extract_tag, extract_tag_from_path, extract_tags_from_paths, ExtractOptions, Id3Error};
use tempfile::{NamedTempFile, TempDir};

/// Tag followed by something that looks like MPEG audio.
fn mp3_bytes(tag: &[u8]) -> Vec<u8> {
    let mut data = tag.to_vec();
    for _ in 0..64 {
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
        data.extend_from_slice(&[0x55; 412]);
    }
    data
}

fn write_temp(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

#[test_log::test]
fn file_handle_and_memory_map_agree() {
    let file = write_temp(&mp3_bytes(&known_v23_tag()));

    let from_handle = extract_tag(&File::open(file.path()).unwrap()).unwrap();
    let from_map = extract_tag_from_path(file.path(), &ExtractOptions::default()).unwrap();

    assert_eq!(from_handle.artist(), ARTIST);
    assert_eq!(from_map.artist(), ARTIST);
    assert_eq!(from_handle.length(), from_map.length());
    assert_eq!(
        from_handle.frame_sets().keys().collect::<Vec<_>>(),
        from_map.frame_sets().keys().collect::<Vec<_>>()
    );
}

#[test]
fn files_without_tags() {
    let empty = write_temp(b"");
    assert!(extract_tag_from_path(empty.path(), &ExtractOptions::default())
        .unwrap_err()
        .is_not_a_tag());

    let audio = write_temp(&mp3_bytes(b""));
    assert!(extract_tag_from_path(audio.path(), &ExtractOptions::default())
        .unwrap_err()
        .is_not_a_tag());

    let missing = extract_tag_from_path("/definitely/not/here.mp3", &ExtractOptions::default());
    assert!(matches!(missing, Err(Id3Error::Io(_))));
}

#[test]
fn rewriting_the_file_changes_the_result() {
    let mut data = mp3_bytes(&known_v23_tag());
    let file = write_temp(&data);
    let handle = File::open(file.path()).unwrap();
    assert_eq!(extract_tag(&handle).unwrap().version(), "3.0");

    data[3] = 4;
    std::fs::write(file.path(), &data).unwrap();
    assert_eq!(extract_tag(&handle).unwrap().version(), "4.0");
}

#[test]
fn shared_handle_across_threads() {
    let file = write_temp(&mp3_bytes(&known_v23_tag()));
    let handle = Arc::new(File::open(file.path()).unwrap());

    let threads: Vec<_> = (0..8)
        .map(|_| {
            let handle = Arc::clone(&handle);
            std::thread::spawn(move || {
                let tag = extract_tag(&handle).unwrap();
                (tag.title().to_string(), tag.frame_sets().frame_count())
            })
        })
        .collect();

    for thread in threads {
        assert_eq!(thread.join().unwrap(), (TITLE.to_string(), 13));
    }
}

#[test]
fn batch_extraction_keeps_order() {
    let dir = TempDir::new().unwrap();
    let mut paths: Vec<PathBuf> = Vec::new();
    for i in 0..12 {
        let path = dir.path().join(format!("{i:02}.mp3"));
        let tag = TagBuilder::new(3 + (i % 2) as u8)
            .text("TIT2", &format!("Song {i}"))
            .text("TRCK", &(i + 1).to_string())
            .padding(32)
            .build();
        std::fs::write(&path, mp3_bytes(&tag)).unwrap();
        paths.push(path);
    }
    let bogus = dir.path().join("not-an-mp3.txt");
    std::fs::write(&bogus, b"plain text").unwrap();
    paths.push(bogus.clone());

    let results = extract_tags_from_paths(&paths, &ExtractOptions::default());
    assert_eq!(results.len(), 13);

    for (i, (path, result)) in results.iter().take(12).enumerate() {
        assert_eq!(path, &paths[i]);
        let tag = result.as_ref().unwrap();
        assert_eq!(tag.title(), format!("Song {i}"));
        assert_eq!(tag.track(), (i + 1).to_string());
    }

    let (path, result) = &results[12];
    assert_eq!(path, &bogus);
    assert!(result.as_ref().unwrap_err().is_not_a_tag());
}
