// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for frame sources and annotation files.

pub mod error;
pub mod media;
pub mod serialization;
