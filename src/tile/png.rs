// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Atlas Core Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reads a PNG's width/height straight out of its `IHDR` chunk, without
//! decoding the image — `Tile::_pngSize`'s approach to checking whether
//! a cached map of the right size already exists.

use std::io::Read;
use std::path::Path;

const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Returns `(width, height)` from the IHDR chunk of the PNG at `path`,
/// or `None` if the file is missing, too short, or not a PNG.
pub fn png_size(path: &Path) -> Option<(u32, u32)> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut header = [0u8; 24];
    file.read_exact(&mut header).ok()?;

    if header[0..8] != PNG_SIGNATURE {
        return None;
    }
    if &header[12..16] != b"IHDR" {
        return None;
    }

    let width = u32::from_be_bytes(header[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(header[20..24].try_into().ok()?);
    Some((width, height))
}
