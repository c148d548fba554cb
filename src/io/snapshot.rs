//! Binary snapshot format for grid persistence.
//!
//! A snapshot captures the resident tiles together with the write clock
//! and per-cell stamps, so eviction order is the same after a reload as
//! it would have been without the restart. The robot pose is runtime
//! state and is not persisted.
//!
//! Format (all integers little-endian):
//! - Header (48 bytes):
//!   - Magic: "KSHETRA" (7 bytes)
//!   - Version: u8
//!   - Resolution: f32 (meters per cell)
//!   - Origin X: f32
//!   - Origin Y: f32
//!   - Tile side: u16
//!   - Reserved: u16 (zero)
//!   - Capacity at write time: u32
//!   - Write clock: u64
//!   - Eviction count: u64
//!   - Tile count: u32
//! - Per tile, ascending by (tx, ty):
//!   - tx: i32, ty: i32
//!   - last_touch: u64
//!   - Occupancy plane: side*side bytes, row-major
//!   - Stamp plane: side*side u64, row-major

use std::io::{Read, Write};
use std::path::Path;

use crate::core::TileCoord;
use crate::error::GridError;
use crate::grid::MapConfig;
use crate::grid::engine::TileGrid;
use crate::grid::store::TileStore;
use crate::grid::tile::Tile;

const MAGIC: &[u8; 7] = b"KSHETRA";
const VERSION: u8 = 1;
const HEADER_SIZE: usize = 48;

/// Errors from reading or writing snapshots
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Underlying file or stream failure
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Data is not a snapshot or is structurally broken
    #[error("invalid snapshot: {0}")]
    InvalidFormat(String),

    /// Written by an incompatible format version
    #[error("snapshot version {found} not supported (expected {expected})")]
    VersionMismatch {
        /// Version this build reads and writes
        expected: u8,
        /// Version found in the file
        found: u8,
    },

    /// Snapshot geometry differs from the loading configuration
    #[error("snapshot geometry mismatch: {0}")]
    GeometryMismatch(String),

    /// Configuration supplied for loading is itself invalid
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Save a grid snapshot to a file.
pub fn save_snapshot(grid: &TileGrid, path: &Path) -> Result<(), SnapshotError> {
    let mut file = std::fs::File::create(path)?;
    write_snapshot(grid, &mut file)?;
    log::info!(
        "saved snapshot to {}: {} tiles, clock {}",
        path.display(),
        grid.stats().resident_tiles,
        grid.stats().clock
    );
    Ok(())
}

/// Write a grid snapshot to a writer.
pub fn write_snapshot<W: Write>(grid: &TileGrid, writer: &mut W) -> Result<(), SnapshotError> {
    let store = grid.store();
    let config = grid.config();
    let stats = grid.stats();

    let mut header = [0u8; HEADER_SIZE];
    header[0..7].copy_from_slice(MAGIC);
    header[7] = VERSION;
    header[8..12].copy_from_slice(&config.grid.resolution.to_le_bytes());
    header[12..16].copy_from_slice(&config.grid.origin.x.to_le_bytes());
    header[16..20].copy_from_slice(&config.grid.origin.y.to_le_bytes());
    header[20..22].copy_from_slice(&config.grid.tile_side.to_le_bytes());
    // 22..24 reserved, already zero
    header[24..28].copy_from_slice(&(config.grid.capacity as u32).to_le_bytes());
    header[28..36].copy_from_slice(&stats.clock.to_le_bytes());
    header[36..44].copy_from_slice(&stats.evictions.to_le_bytes());
    header[44..48].copy_from_slice(&(store.len() as u32).to_le_bytes());
    writer.write_all(&header)?;

    // Fixed tile order keeps the byte stream reproducible
    let mut tiles: Vec<(TileCoord, &Tile)> = store.iter().collect();
    tiles.sort_unstable_by_key(|&(coord, _)| coord);

    for (coord, tile) in tiles {
        let cells = tile.occupancy_plane().len();
        let mut body = Vec::with_capacity(16 + cells * 9);
        body.extend_from_slice(&coord.tx.to_le_bytes());
        body.extend_from_slice(&coord.ty.to_le_bytes());
        body.extend_from_slice(&tile.last_touch().to_le_bytes());
        body.extend_from_slice(tile.occupancy_plane());
        for &stamp in tile.stamp_plane() {
            body.extend_from_slice(&stamp.to_le_bytes());
        }
        writer.write_all(&body)?;
    }

    Ok(())
}

/// Load a grid snapshot from a file.
///
/// The caller's configuration governs: geometry (resolution, origin,
/// tile side) must match the snapshot exactly, while the configured
/// capacity replaces the stored one. A snapshot holding more tiles than
/// the new capacity is trimmed oldest-first on load.
pub fn load_snapshot(path: &Path, config: MapConfig) -> Result<TileGrid, SnapshotError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    let grid = read_snapshot(&mut reader, config)?;
    log::info!(
        "loaded snapshot from {}: {} tiles, clock {}",
        path.display(),
        grid.stats().resident_tiles,
        grid.stats().clock
    );
    Ok(grid)
}

/// Read a grid snapshot from a reader.
pub fn read_snapshot<R: Read>(reader: &mut R, config: MapConfig) -> Result<TileGrid, SnapshotError> {
    config.validate()?;

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    if &header[0..7] != MAGIC {
        return Err(SnapshotError::InvalidFormat("bad magic bytes".to_string()));
    }
    let version = header[7];
    if version != VERSION {
        return Err(SnapshotError::VersionMismatch {
            expected: VERSION,
            found: version,
        });
    }

    let resolution = read_f32(&header[8..12]);
    let origin_x = read_f32(&header[12..16]);
    let origin_y = read_f32(&header[16..20]);
    let tile_side = read_u16(&header[20..22]);
    let written_capacity = read_u32(&header[24..28]);
    let clock = read_u64(&header[28..36]);
    let evictions = read_u64(&header[36..44]);
    let tile_count = read_u32(&header[44..48]);

    let g = &config.grid;
    if resolution.to_bits() != g.resolution.to_bits() {
        return Err(SnapshotError::GeometryMismatch(format!(
            "resolution {} in snapshot, {} configured",
            resolution, g.resolution
        )));
    }
    if origin_x.to_bits() != g.origin.x.to_bits() || origin_y.to_bits() != g.origin.y.to_bits() {
        return Err(SnapshotError::GeometryMismatch(format!(
            "origin ({}, {}) in snapshot, ({}, {}) configured",
            origin_x, origin_y, g.origin.x, g.origin.y
        )));
    }
    if tile_side != g.tile_side {
        return Err(SnapshotError::GeometryMismatch(format!(
            "tile side {} in snapshot, {} configured",
            tile_side, g.tile_side
        )));
    }
    if written_capacity as usize != g.capacity {
        log::debug!(
            "snapshot written with capacity {}, loading with {}",
            written_capacity,
            g.capacity
        );
    }

    let cells = tile_side as usize * tile_side as usize;
    let mut store = TileStore::new(g.tile_side, g.capacity);
    let mut tile_header = [0u8; 16];
    for _ in 0..tile_count {
        reader.read_exact(&mut tile_header)?;
        let tx = read_i32(&tile_header[0..4]);
        let ty = read_i32(&tile_header[4..8]);
        let last_touch = read_u64(&tile_header[8..16]);

        let mut occupancy = vec![0u8; cells];
        reader.read_exact(&mut occupancy)?;

        let mut stamp_bytes = vec![0u8; cells * 8];
        reader.read_exact(&mut stamp_bytes)?;
        let stamps: Box<[u64]> = stamp_bytes
            .chunks_exact(8)
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect();

        let tile = Tile::from_planes(tile_side, occupancy.into_boxed_slice(), stamps, last_touch)?;
        store.insert_restored(TileCoord::new(tx, ty), tile);
    }
    if store.len() != tile_count as usize {
        return Err(SnapshotError::InvalidFormat(
            "duplicate tile coordinates".to_string(),
        ));
    }
    store.set_evictions(evictions);

    let dropped = store.evict_over_capacity();
    if dropped > 0 {
        log::warn!(
            "snapshot holds more tiles than capacity {}, dropped {} oldest",
            g.capacity,
            dropped
        );
    }

    // The clock must not lag any stored stamp
    let clock = clock.max(store.newest_touch());
    Ok(TileGrid::from_restored(config, store, clock))
}

fn read_u16(bytes: &[u8]) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&bytes[..2]);
    u16::from_le_bytes(buf)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    i32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_le_bytes(buf)
}

fn read_f32(bytes: &[u8]) -> f32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    f32::from_le_bytes(buf)
}
