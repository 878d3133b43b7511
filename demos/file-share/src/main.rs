// Copyright (c) 2026 The Swarmstore Authors.
//
// This software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the software is distributed
// under the GPL Licence on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
// either express or implied. Please review the Licence for the specific language governing
// permissions and limitations under the Licence.

//! A file-sharing demo on top of the node façade: chunk a file into fixed
//! pieces, hash and store each piece under its own key, store a manifest
//! keyed by the whole file's hash, and print a magnet-style reference.
//! This is a demo, not part of the core: no persistence beyond the DHT
//! itself, no resumable transfers.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use swarmstore_node::{EngineKind, NodeHandle};

/// 1 MiB, matching the original torrent-style chunk size.
const PIECE_SIZE: usize = 1024 * 1024;
const RETRY_TIMES: u32 = 3;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EngineArg {
    Chord,
    Kademlia,
}

impl From<EngineArg> for EngineKind {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::Chord => EngineKind::Chord,
            EngineArg::Kademlia => EngineKind::Kademlia,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "swarmstore-file-share", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Which overlay to run.
    #[clap(long, value_enum, default_value = "kademlia")]
    engine: EngineArg,

    /// Address to listen on, "host:port".
    #[clap(long, default_value = "0.0.0.0:0")]
    listen: String,

    /// Bootstrap peer to join through. Omit to create a brand-new network.
    #[clap(long)]
    bootstrap: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk a file, store each piece and a manifest, print a magnet key.
    Upload { path: PathBuf },
    /// Fetch a manifest by its magnet key, fetch every piece, reassemble.
    Download { key: String, out: PathBuf },
}

/// Stored under the whole file's content hash. Mirrors the original
/// torrent's bencoded info dict: per-piece hashes, piece size, total
/// length, and the original file name.
#[derive(Serialize, Deserialize)]
struct Manifest {
    name: String,
    length: usize,
    piece_length: usize,
    piece_hashes: Vec<String>,
}

fn sha1_hex(data: &[u8]) -> String {
    let digest = Sha1::digest(data);
    bytes_to_hex(&digest)
}

fn bytes_to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

/// Piece bytes are arbitrary binary data, but the façade's Put/Get only
/// carry `String`s; hex-encoding (rather than reinterpreting the bytes as
/// UTF-8) keeps every value a valid string for the wire codec.
fn hex_to_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

fn magnet(info_hash: &str) -> String {
    format!("magnet:?xt=urn:btih:{info_hash}")
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let handle = NodeHandle::new(cli.engine.into(), cli.listen.clone());
    handle.run().await?;
    let joined = match &cli.bootstrap {
        Some(addr) => handle.join(std::slice::from_ref(addr)).await,
        None => handle.create().await,
    };
    if !joined {
        eyre::bail!("failed to join or create the network");
    }

    match cli.command {
        Command::Upload { path } => upload(&handle, &path).await,
        Command::Download { key, out } => download(&handle, &key, &out).await,
    }?;

    handle.quit().await;
    Ok(())
}

async fn upload(handle: &NodeHandle, path: &PathBuf) -> eyre::Result<()> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());

    let pieces: Vec<&[u8]> = bytes.chunks(PIECE_SIZE).collect();
    let mut piece_hashes = Vec::with_capacity(pieces.len());
    for (idx, piece) in pieces.iter().enumerate() {
        let key = sha1_hex(piece);
        let stored = put_with_retry(handle, &key, bytes_to_hex(piece)).await;
        if !stored {
            eyre::bail!("failed to upload piece {}/{}", idx + 1, pieces.len());
        }
        piece_hashes.push(key);
        tracing::info!(piece = idx + 1, total = pieces.len(), "uploaded piece");
    }

    let manifest = Manifest { name, length: bytes.len(), piece_length: PIECE_SIZE, piece_hashes };
    let manifest_json = serde_json::to_string(&manifest)?;
    let info_hash = sha1_hex(manifest_json.as_bytes());

    if !handle.put(info_hash.clone(), manifest_json).await {
        eyre::bail!("failed to store manifest");
    }

    println!("{}", magnet(&info_hash));
    Ok(())
}

async fn download(handle: &NodeHandle, key: &str, out: &PathBuf) -> eyre::Result<()> {
    let info_hash = key.trim_start_matches("magnet:?xt=urn:btih:");
    let (found, manifest_json) = handle.get(info_hash).await;
    if !found {
        eyre::bail!("manifest not found for key {info_hash}");
    }
    let manifest: Manifest = serde_json::from_str(&manifest_json)?;

    let mut data = Vec::with_capacity(manifest.length);
    for (idx, piece_key) in manifest.piece_hashes.iter().enumerate() {
        let piece_hex = get_with_retry(handle, piece_key).await;
        let piece_hex = match piece_hex {
            Some(piece) => piece,
            None => eyre::bail!("failed to download piece {}/{}", idx + 1, manifest.piece_hashes.len()),
        };
        let piece = hex_to_bytes(&piece_hex)
            .ok_or_else(|| eyre::eyre!("piece {} was not valid hex", idx + 1))?;
        if sha1_hex(&piece) != *piece_key {
            eyre::bail!("piece {} failed integrity check", idx + 1);
        }
        data.extend_from_slice(&piece);
        tracing::info!(piece = idx + 1, total = manifest.piece_hashes.len(), "downloaded piece");
    }

    fs::write(out, &data)?;
    println!("saved {} bytes to {}", data.len(), out.display());
    Ok(())
}

async fn put_with_retry(handle: &NodeHandle, key: &str, value: String) -> bool {
    for _ in 0..=RETRY_TIMES {
        if handle.put(key.to_string(), value.clone()).await {
            return true;
        }
    }
    false
}

async fn get_with_retry(handle: &NodeHandle, key: &str) -> Option<String> {
    for _ in 0..=RETRY_TIMES {
        let (found, value) = handle.get(key).await;
        if found {
            return Some(value);
        }
    }
    None
}
