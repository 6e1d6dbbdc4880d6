// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model for annotations and annotation units.

pub mod annotation;
pub mod unit;
