/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

//! World files.
//!
//! ```text
//! 3        <- columns
//! 2        <- rows
//! @_*
//! #_*
//! ```
//!
//! `_` clear, `*` dirty, `#` blocked, `@` the agent's start (clean). Files may be UTF-8 or UTF-16
//! with a byte-order mark.

use std::path::Path;

use log::debug;

use crate::{CellKind, Grid, World, WorldError};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

// Locations are i32 coordinates.
const MAX_DIMENSION: usize = i32::MAX as usize;

/// Read and parse a world file.
pub fn load_world(path: impl AsRef<Path>) -> Result<World, WorldError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| WorldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    parse_world(&decode_world(&bytes)?)
}

/// Decode world-file bytes. A UTF-16 byte-order mark selects UTF-16, anything else is UTF-8.
pub fn decode_world(bytes: &[u8]) -> Result<String, WorldError> {
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        decode_utf16(rest, u16::from_le_bytes)
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        decode_utf16(rest, u16::from_be_bytes)
    } else {
        let rest = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        String::from_utf8(rest.to_vec()).map_err(|e| WorldError::InvalidEncoding(e.to_string()))
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, WorldError> {
    if bytes.len() % 2 != 0 {
        return Err(WorldError::InvalidEncoding(format!(
            "odd number of bytes ({}) in UTF-16 text",
            bytes.len()
        )));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| WorldError::InvalidEncoding(e.to_string()))
}

fn parse_dimension(line: Option<&str>, name: &'static str) -> Result<usize, WorldError> {
    let line = line.ok_or(WorldError::MissingHeader(name))?;
    match line.parse::<usize>() {
        Ok(value) if value > 0 && value <= MAX_DIMENSION => Ok(value),
        _ => Err(WorldError::InvalidDimension {
            name,
            value: line.to_string(),
        }),
    }
}

/// Parse world-file text into a World.
pub fn parse_world(text: &str) -> Result<World, WorldError> {
    let mut lines = text.lines().map(str::trim_end);
    let cols = parse_dimension(lines.next(), "column count")?;
    let rows = parse_dimension(lines.next(), "row count")?;

    let mut body: Vec<&str> = lines.collect();
    while body.last().map_or(false, |line| line.is_empty()) {
        body.pop();
    }
    if body.len() != rows {
        return Err(WorldError::RowCountMismatch {
            expected: rows,
            actual: body.len(),
        });
    }

    if rows.checked_mul(cols).is_none() {
        return Err(WorldError::InvalidDimension {
            name: "column count",
            value: cols.to_string(),
        });
    }

    let mut cells = Vec::new();
    for (row, line) in body.iter().enumerate() {
        let row_cells = line
            .chars()
            .enumerate()
            .map(|(col, c)| {
                CellKind::try_from(c).map_err(|found| WorldError::UnknownCell { row, col, found })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if row_cells.len() != cols {
            return Err(WorldError::RowLengthMismatch {
                row,
                expected: cols,
                actual: row_cells.len(),
            });
        }
        cells.extend(row_cells);
    }

    let world = World::from_grid(Grid::new(rows, cols, cells)?)?;
    debug!(
        "parsed {}x{} world, start {}, {} dirty, {} blocked",
        rows,
        cols,
        world.initial_state.position(),
        world.initial_state.dirty_cells().len(),
        world.blocked.len()
    );
    Ok(world)
}
