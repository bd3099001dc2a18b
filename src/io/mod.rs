// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: persistence, template uploads, project files, media
//! decoding and raster export.

pub mod export;
pub mod media;
pub mod serialization;
pub mod storage;
pub mod templates;
