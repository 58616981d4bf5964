//! Default torrent directories of common BitTorrent clients.
//!
//! Locations are resolved through `dirs-next`, so they follow each
//! platform's conventions (XDG on Linux, `Library/Application Support` on
//! macOS, `%APPDATA%` on Windows). Directories that do not exist are
//! skipped.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::discover::{Discovery, discover};
use crate::{Error, Result};

/// A BitTorrent client whose torrent store can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TorrentClient {
    /// qBittorrent (`BT_backup`).
    QBittorrent,
    /// Deluge (`state`).
    Deluge,
    /// Transmission desktop clients.
    Transmission,
    /// `transmission-daemon`.
    TransmissionDaemon,
    /// µTorrent.
    UTorrent,
}

impl TorrentClient {
    /// All supported clients.
    pub const ALL: &'static [TorrentClient] = &[
        TorrentClient::QBittorrent,
        TorrentClient::Deluge,
        TorrentClient::Transmission,
        TorrentClient::TransmissionDaemon,
        TorrentClient::UTorrent,
    ];

    /// Returns the client's command-line name.
    pub fn name(&self) -> &'static str {
        match self {
            TorrentClient::QBittorrent => "qbittorrent",
            TorrentClient::Deluge => "deluge",
            TorrentClient::Transmission => "transmission",
            TorrentClient::TransmissionDaemon => "transmission-daemon",
            TorrentClient::UTorrent => "utorrent",
        }
    }

    /// Returns every candidate directory for this client, existing or not.
    pub fn default_dirs(&self) -> Vec<PathBuf> {
        let config = dirs_next::config_dir();
        let data = dirs_next::data_dir();
        let data_local = dirs_next::data_local_dir();
        let home = dirs_next::home_dir();

        let candidates = match self {
            TorrentClient::QBittorrent => vec![
                data_local.map(|d| d.join("qBittorrent").join("BT_backup")),
                home.map(|h| h.join(".local/share/data/qBittorrent/BT_backup")),
            ],
            TorrentClient::Deluge => vec![config.map(|c| c.join("deluge").join("state"))],
            TorrentClient::Transmission => vec![
                config.as_ref().map(|c| c.join("transmission").join("torrents")),
                config.map(|c| c.join("Transmission").join("Torrents")),
            ],
            TorrentClient::TransmissionDaemon => vec![
                config.map(|c| c.join("transmission-daemon").join("torrents")),
                Some(PathBuf::from(
                    "/var/lib/transmission-daemon/.config/transmission-daemon/torrents",
                )),
            ],
            TorrentClient::UTorrent => vec![data.map(|d| d.join("uTorrent"))],
        };
        candidates.into_iter().flatten().collect()
    }

    /// Returns the default directories that exist on this machine.
    pub fn existing_dirs(&self) -> Vec<PathBuf> {
        self.default_dirs()
            .into_iter()
            .filter(|dir| dir.is_dir())
            .collect()
    }
}

impl fmt::Display for TorrentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TorrentClient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        TorrentClient::ALL
            .iter()
            .copied()
            .find(|client| client.name() == lower)
            .ok_or_else(|| Error::WrongTransformOperation {
                operation: format!("unknown client '{}'", s),
            })
    }
}

/// Discovers the `.torrent` files in every existing default directory of
/// `client`.
pub fn discover_client(client: TorrentClient) -> Discovery {
    let mut found = Discovery::default();
    for dir in client.existing_dirs() {
        found.extend(discover(&dir, None));
    }
    found
}
