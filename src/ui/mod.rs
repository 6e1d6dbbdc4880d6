// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the annotation window.

pub mod canvas;
pub mod properties;
pub mod timeline;
pub mod toolbar;

/// Overlay visibility toggles. Display only; never touches annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub show_others: bool,
    pub show_past: bool,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            show_others: true,
            show_past: true,
        }
    }
}
