//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::PathBuf;
use tempfile::TempDir;

use announcebulk::bencode::{Dict, Value, encode};

/// Builds a torrent-like document with the given announce URL and
/// announce-list entries.
///
/// Keys are inserted in sorted order, as real torrent files store them.
pub fn torrent(announce: &str, announce_list: &[&str]) -> Value {
    let mut info = Dict::new();
    info.insert("length", Value::Integer(1024));
    info.insert("name", Value::from("ubuntu.iso"));
    info.insert("piece length", Value::Integer(262_144));
    info.insert("pieces", Value::Bytes(vec![0xAB; 20]));

    let mut root = Dict::new();
    root.insert("announce", Value::from(announce));
    if !announce_list.is_empty() {
        root.insert(
            "announce-list",
            Value::List(announce_list.iter().map(|url| Value::from(*url)).collect()),
        );
    }
    root.insert("comment", Value::from("test torrent"));
    root.insert("creation date", Value::Integer(1_600_000_000));
    root.insert("info", Value::Dict(info));
    Value::Dict(root)
}

/// Encodes [`torrent`] directly.
pub fn torrent_bytes(announce: &str, announce_list: &[&str]) -> Vec<u8> {
    encode(&torrent(announce, announce_list))
}

/// A torrent announcing to the old Apollo tracker.
pub fn apollo_torrent() -> Vec<u8> {
    torrent_bytes(
        "https://apollo.rip:2095/abcdef/announce",
        &["https://apollo.rip:2095/abcdef/announce", "udp://tracker.example:1337"],
    )
}

/// The same torrent after migration to Orpheus.
pub fn orpheus_torrent() -> Vec<u8> {
    torrent_bytes(
        "https://orpheus.network:2095/abcdef/announce",
        &["https://orpheus.network:2095/abcdef/announce", "udp://tracker.example:1337"],
    )
}

/// Writes each `(name, data)` pair into a fresh temporary directory.
///
/// Names may contain `/` to create subdirectories.
pub fn write_files(files: &[(&str, &[u8])]) -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut paths = Vec::new();
    for (name, data) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, data).expect("Failed to write file");
        paths.push(path);
    }
    (dir, paths)
}

/// Reads a file, panicking on failure.
pub fn read(path: &PathBuf) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read file")
}
