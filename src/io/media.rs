// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame sources (folders of images and multi-page TIFF files).
//!
//! This module turns an input path into an indexed sequence of RGBA frames,
//! each carrying the reference label that annotation files key on.

use super::error::FrameError;
use crate::models::annotation::FrameRef;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage, RgbaImage};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::ColorType;

/// Extensions picked up when reading a folder of images.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp"];

/// Largest number of interleaved channels a paged file may be grouped by.
pub const MAX_CHANNELS_PER_TIMESTAMP: usize = 4;

/// One decoded frame ready for display.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    pub reference: FrameRef,
}

/// An indexed sequence of frames.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    /// Reference label of frame `index`, without decoding it.
    fn frame_ref(&self, index: usize) -> Result<FrameRef, FrameError>;

    /// Decode frame `index`. Fails with [`FrameError::OutOfRange`] past the end.
    fn frame(&mut self, index: usize) -> Result<Frame, FrameError>;

    /// Pages per timestamp, for sources that interleave channels.
    fn channels_per_timestamp(&self) -> Option<usize> {
        None
    }

    /// Regroup pages; returns whether the source supports it.
    fn set_channels_per_timestamp(&mut self, _channels: usize) -> bool {
        false
    }
}

/// Open `path` as a folder or multi-page TIFF source.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>, FrameError> {
    if path.is_dir() {
        return Ok(Box::new(FolderSource::open(path)?));
    }
    match lowercase_extension(path).as_deref() {
        Some("tif" | "tiff") => Ok(Box::new(PagedSource::open_tiff(path)?)),
        _ => Err(FrameError::Unsupported(format!(
            "{} is neither a folder nor a TIFF file",
            path.display()
        ))),
    }
}

fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn out_of_range(index: usize, count: usize) -> FrameError {
    FrameError::OutOfRange { index, count }
}

/// A directory of single-image files, in file name order.
#[derive(Debug, Clone)]
pub struct FolderSource {
    files: Vec<PathBuf>,
}

impl FolderSource {
    pub fn open(dir: &Path) -> Result<Self, FrameError> {
        let mut files = Vec::new();
        for dir_entry in std::fs::read_dir(dir)? {
            let path = dir_entry?.path();
            let is_image = lowercase_extension(&path)
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        files.sort();
        log::info!("Found {} images in {}", files.len(), dir.display());
        Ok(Self { files })
    }

    fn path(&self, index: usize) -> Result<&Path, FrameError> {
        self.files
            .get(index)
            .map(PathBuf::as_path)
            .ok_or_else(|| out_of_range(index, self.files.len()))
    }
}

impl FrameSource for FolderSource {
    fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn frame_ref(&self, index: usize) -> Result<FrameRef, FrameError> {
        let path = self.path(index)?;
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(FrameRef::new(stem))
    }

    fn frame(&mut self, index: usize) -> Result<Frame, FrameError> {
        let path = self.path(index)?;
        let image = image::open(path)?.to_rgba8();
        log::debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        Ok(Frame {
            image,
            reference: self.frame_ref(index)?,
        })
    }
}

/// Pages of a multi-page file, optionally grouped into timestamps of
/// several interleaved channels. Only the first channel is shown.
#[derive(Debug, Clone)]
pub struct PagedSource {
    pages: Vec<RgbaImage>,
    channels: usize,
}

impl PagedSource {
    pub fn from_pages(pages: Vec<RgbaImage>) -> Self {
        Self { pages, channels: 1 }
    }

    pub fn open_tiff(path: &Path) -> Result<Self, FrameError> {
        let mut decoder = Decoder::new(BufReader::new(File::open(path)?))?;
        let mut pages = Vec::new();
        loop {
            pages.push(decode_page(&mut decoder)?);
            if !decoder.more_images() {
                break;
            }
            decoder.next_image()?;
        }
        log::info!("Read {} pages from {}", pages.len(), path.display());
        Ok(Self::from_pages(pages))
    }

    fn check(&self, index: usize) -> Result<(), FrameError> {
        let count = self.frame_count();
        if index < count {
            Ok(())
        } else {
            Err(out_of_range(index, count))
        }
    }
}

impl FrameSource for PagedSource {
    fn frame_count(&self) -> usize {
        self.pages.len() / self.channels
    }

    fn frame_ref(&self, index: usize) -> Result<FrameRef, FrameError> {
        self.check(index)?;
        Ok(FrameRef::new(format!("timestamp_{index}")))
    }

    fn frame(&mut self, index: usize) -> Result<Frame, FrameError> {
        self.check(index)?;
        Ok(Frame {
            image: self.pages[index * self.channels].clone(),
            reference: self.frame_ref(index)?,
        })
    }

    fn channels_per_timestamp(&self) -> Option<usize> {
        Some(self.channels)
    }

    fn set_channels_per_timestamp(&mut self, channels: usize) -> bool {
        self.channels = channels.clamp(1, MAX_CHANNELS_PER_TIMESTAMP);
        log::info!(
            "Grouping pages by {} channels: {} timestamps",
            self.channels,
            self.frame_count()
        );
        true
    }
}

fn decode_page<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<RgbaImage, FrameError> {
    let (width, height) = decoder.dimensions()?;
    let color = decoder.colortype()?;
    let image = match (decoder.read_image()?, color) {
        (DecodingResult::U8(buf), ColorType::Gray(8)) => {
            GrayImage::from_raw(width, height, buf).map(DynamicImage::ImageLuma8)
        }
        (DecodingResult::U8(buf), ColorType::RGB(8)) => {
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        }
        (DecodingResult::U8(buf), ColorType::RGBA(8)) => {
            RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
        }
        (DecodingResult::U16(buf), ColorType::Gray(16)) => {
            ImageBuffer::<Luma<u16>, _>::from_raw(width, height, buf).map(DynamicImage::ImageLuma16)
        }
        (DecodingResult::U16(buf), ColorType::RGB(16)) => {
            ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, buf).map(DynamicImage::ImageRgb16)
        }
        (_, other) => {
            return Err(FrameError::Unsupported(format!("TIFF colour type {other:?}")));
        }
    };
    image
        .map(|image| image.to_rgba8())
        .ok_or_else(|| FrameError::Unsupported("TIFF page smaller than its dimensions".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]))
    }

    #[test]
    fn test_folder_source_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        page(10).save(dir.path().join("b.png")).unwrap();
        page(20).save(dir.path().join("a.png")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a frame").unwrap();

        let mut source = FolderSource::open(dir.path()).unwrap();
        assert_eq!(source.frame_count(), 2);
        assert_eq!(source.frame_ref(0).unwrap(), FrameRef::new("a"));

        let frame = source.frame(1).unwrap();
        assert_eq!(frame.reference, FrameRef::new("b"));
        assert_eq!(frame.image.get_pixel(0, 0)[0], 10);

        let err = source.frame(2).unwrap_err();
        assert!(err.is_exhausted());
    }

    #[test]
    fn test_paged_source_groups_channels() {
        let mut source = PagedSource::from_pages((0..6).map(page).collect());
        assert_eq!(source.frame_count(), 6);

        assert!(source.set_channels_per_timestamp(2));
        assert_eq!(source.frame_count(), 3);
        let frame = source.frame(2).unwrap();
        assert_eq!(frame.reference, FrameRef::new("timestamp_2"));
        assert_eq!(frame.image.get_pixel(0, 0)[0], 4);
        assert!(source.frame(3).unwrap_err().is_exhausted());

        source.set_channels_per_timestamp(9);
        assert_eq!(source.channels_per_timestamp(), Some(MAX_CHANNELS_PER_TIMESTAMP));
    }

    #[test]
    fn test_open_source_rejects_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(open_source(&path), Err(FrameError::Unsupported(_))));
    }
}
