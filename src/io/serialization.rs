// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation file serialization and deserialization.
//!
//! Detection sessions are stored as a map from frame reference to the list
//! of rectangles drawn on that frame. Tracking sessions are stored as a list
//! of objects, each mapping frame index to its rectangle. Files are JSON by
//! default and YAML when the path ends in `.yaml`/`.yml`.

use super::error::CodecError;
use crate::models::annotation::{AnnotationEntry, FrameRef, Rect};
use crate::models::unit::{FrameObjects, ObjectTrack, Unit};
use chrono::NaiveDateTime;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Conversion between a unit collection and its on-disk document.
pub trait Codec: Unit {
    type Document: Serialize + DeserializeOwned;

    /// Build the document for `completed`, followed by `in_progress` when
    /// given. The caller's units are not modified.
    fn to_document(completed: &[Self], in_progress: Option<&Self>) -> Self::Document;

    /// Rebuild units from a document, rejecting rectangles without extent.
    fn from_document(document: Self::Document) -> Result<Vec<Self>, CodecError>;
}

/// One stored rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub rect: Rect,
}

/// Frame reference → objects, in the order frames were completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionDocument(pub Vec<(String, Vec<ObjectRecord>)>);

impl DetectionDocument {
    /// Insert or overwrite in place, keeping the first position of a key.
    pub fn insert(&mut self, frame_ref: String, objects: Vec<ObjectRecord>) {
        match self.0.iter_mut().find(|(existing, _)| *existing == frame_ref) {
            Some((_, slot)) => *slot = objects,
            None => self.0.push((frame_ref, objects)),
        }
    }
}

impl Serialize for DetectionDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (frame_ref, objects) in &self.0 {
            map.serialize_entry(frame_ref, objects)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DetectionDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = DetectionDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from frame reference to a list of objects")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut document = DetectionDocument::default();
                while let Some((frame_ref, objects)) = access.next_entry()? {
                    document.insert(frame_ref, objects);
                }
                Ok(document)
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// One tracked position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimestampRecord {
    pub rect: Rect,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub frame_ref: Option<FrameRef>,
}

/// One tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: usize,
    pub timestamps: BTreeMap<usize, TimestampRecord>,
}

fn checked(rect: Rect, frame: impl fmt::Display) -> Result<Rect, CodecError> {
    if rect.is_valid() {
        Ok(rect)
    } else {
        Err(CodecError::InvalidRect {
            frame: frame.to_string(),
            rect,
        })
    }
}

impl Codec for FrameObjects {
    type Document = DetectionDocument;

    fn to_document(completed: &[Self], in_progress: Option<&Self>) -> DetectionDocument {
        let mut document = DetectionDocument::default();
        for unit in completed.iter().chain(in_progress) {
            let objects = unit
                .objects
                .iter()
                .map(|entry| ObjectRecord { rect: entry.rect })
                .collect();
            document.insert(unit.frame_ref.0.clone(), objects);
        }
        document
    }

    fn from_document(document: DetectionDocument) -> Result<Vec<Self>, CodecError> {
        document
            .0
            .into_iter()
            .map(|(label, records)| {
                let frame_ref = FrameRef::new(label);
                let objects = records
                    .into_iter()
                    .map(|record| {
                        let rect = checked(record.rect, &frame_ref)?;
                        Ok(AnnotationEntry::new(rect, frame_ref.clone()))
                    })
                    .collect::<Result<Vec<_>, CodecError>>()?;
                Ok(FrameObjects::new(frame_ref, objects))
            })
            .collect()
    }
}

impl Codec for ObjectTrack {
    type Document = Vec<TrackRecord>;

    fn to_document(completed: &[Self], in_progress: Option<&Self>) -> Vec<TrackRecord> {
        completed
            .iter()
            .chain(in_progress)
            .enumerate()
            .map(|(id, track)| TrackRecord {
                id,
                timestamps: track
                    .positions
                    .iter()
                    .map(|(frame, entry)| {
                        let record = TimestampRecord {
                            rect: entry.rect,
                            frame_ref: entry.frame_ref.clone(),
                        };
                        (*frame, record)
                    })
                    .collect(),
            })
            .collect()
    }

    fn from_document(document: Vec<TrackRecord>) -> Result<Vec<Self>, CodecError> {
        document
            .into_iter()
            .map(|record| {
                let positions = record
                    .timestamps
                    .into_iter()
                    .map(|(frame, stamp)| {
                        let rect = checked(stamp.rect, frame)?;
                        let entry = AnnotationEntry {
                            rect,
                            frame_ref: stamp.frame_ref,
                        };
                        Ok((frame, entry))
                    })
                    .collect::<Result<BTreeMap<_, _>, CodecError>>()?;
                Ok(ObjectTrack::new(positions))
            })
            .collect()
    }
}

/// On-disk syntax of an annotation file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    #[default]
    Json,
    Yaml,
}

impl DocumentFormat {
    /// YAML for `.yaml`/`.yml` paths, JSON otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }
}

/// Write a document to `path` in the format its extension names.
pub fn write_document<D: Serialize>(document: &D, path: &Path) -> Result<(), CodecError> {
    let text = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::to_string_pretty(document)?,
        DocumentFormat::Yaml => serde_yaml::to_string(document)?,
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Read a document from `path` in the format its extension names.
pub fn read_document<D: DeserializeOwned>(path: &Path) -> Result<D, CodecError> {
    let text = std::fs::read_to_string(path)?;
    let document = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => serde_json::from_str(&text)?,
        DocumentFormat::Yaml => serde_yaml::from_str(&text)?,
    };
    Ok(document)
}

/// `save_<date>_<time>[_<suffix>].<ext>` inside `dir`, with `-N` appended
/// when that name is taken.
pub fn save_path(
    dir: &Path,
    suffix: Option<&str>,
    format: DocumentFormat,
    now: NaiveDateTime,
) -> PathBuf {
    let mut stem = format!("save_{}", now.format("%Y-%m-%d_%H-%M-%S"));
    if let Some(suffix) = suffix {
        stem.push('_');
        stem.push_str(suffix);
    }
    let ext = format.extension();
    let mut path = dir.join(format!("{stem}.{ext}"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}-{n}.{ext}"));
        n += 1;
    }
    path
}

/// Serialize units and write them to `path`.
pub fn save_units<U: Codec>(
    completed: &[U],
    in_progress: Option<&U>,
    path: &Path,
) -> Result<(), CodecError> {
    write_document(&U::to_document(completed, in_progress), path)
}

/// Read and validate a unit collection. Nothing is returned unless the whole
/// file is valid.
pub fn load_units<U: Codec>(path: &Path) -> Result<Vec<U>, CodecError> {
    U::from_document(read_document(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Point;
    use chrono::NaiveDate;

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Rect {
        Rect::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    fn frame(label: &str, rects: &[Rect]) -> FrameObjects {
        let frame_ref = FrameRef::new(label);
        let objects = rects
            .iter()
            .map(|r| AnnotationEntry::new(*r, frame_ref.clone()))
            .collect();
        FrameObjects::new(frame_ref, objects)
    }

    fn track(frames: &[(usize, Rect)]) -> ObjectTrack {
        ObjectTrack::new(
            frames
                .iter()
                .map(|(f, r)| (*f, AnnotationEntry::new(*r, FrameRef::new(format!("timestamp_{f}")))))
                .collect(),
        )
    }

    #[test]
    fn test_detection_document_layout() {
        let units = vec![
            frame("f0", &[rect(5, 5, 10, 10), rect(1, 1, 4, 4)]),
            frame("f1", &[]),
        ];
        let json = serde_json::to_value(FrameObjects::to_document(&units, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "f0": [
                    {"rect": {"start": [5, 5], "end": [10, 10]}},
                    {"rect": {"start": [1, 1], "end": [4, 4]}}
                ],
                "f1": []
            })
        );
    }

    #[test]
    fn test_detection_keeps_completion_order() {
        let units = vec![frame("z", &[]), frame("a", &[]), frame("m", &[])];
        let text = serde_json::to_string(&FrameObjects::to_document(&units, None)).unwrap();
        assert_eq!(text, r#"{"z":[],"a":[],"m":[]}"#);

        let document: DetectionDocument = serde_json::from_str(&text).unwrap();
        let keys: Vec<_> = document.0.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_in_progress_overwrites_same_frame() {
        let units = vec![frame("f0", &[rect(0, 0, 2, 2)]), frame("f1", &[])];
        let current = frame("f0", &[rect(3, 3, 6, 6)]);
        let document = FrameObjects::to_document(&units, Some(&current));
        assert_eq!(document.0.len(), 2);
        assert_eq!(document.0[0].1, vec![ObjectRecord { rect: rect(3, 3, 6, 6) }]);
    }

    #[test]
    fn test_tracking_document_layout() {
        let units = vec![track(&[(0, rect(1, 2, 3, 4))])];
        let current = ObjectTrack::new(BTreeMap::from([(
            4,
            AnnotationEntry {
                rect: rect(5, 5, 9, 9),
                frame_ref: None,
            },
        )]));
        let json = serde_json::to_value(ObjectTrack::to_document(&units, Some(&current))).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 0, "timestamps": {"0": {"rect": {"start": [1, 2], "end": [3, 4]}, "ref": "timestamp_0"}}},
                {"id": 1, "timestamps": {"4": {"rect": {"start": [5, 5], "end": [9, 9]}}}}
            ])
        );
    }

    #[test]
    fn test_detection_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let units = vec![
            frame("img_001", &[rect(5, 5, 10, 10), rect(1, 1, 4, 4)]),
            frame("img_002", &[]),
        ];
        for name in ["detections.json", "detections.yaml"] {
            let path = dir.path().join(name);
            save_units(&units, None, &path).unwrap();
            let loaded: Vec<FrameObjects> = load_units(&path).unwrap();
            assert_eq!(loaded, units, "{name}");
        }
    }

    #[test]
    fn test_tracking_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let units = vec![
            track(&[(0, rect(1, 1, 5, 5)), (1, rect(2, 2, 6, 6)), (2, rect(3, 3, 7, 7))]),
            track(&[(10, rect(0, 0, 1, 1))]),
        ];
        for name in ["tracks.json", "tracks.yml"] {
            let path = dir.path().join(name);
            save_units(&units, None, &path).unwrap();
            let loaded: Vec<ObjectTrack> = load_units(&path).unwrap();
            assert_eq!(loaded, units, "{name}");
        }
    }

    #[test]
    fn test_load_rejects_degenerate_rect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"[{"id": 0, "timestamps": {"3": {"rect": {"start": [5, 5], "end": [5, 9]}}}}]"#,
        )
        .unwrap();
        let err = load_units::<ObjectTrack>(&path).unwrap_err();
        assert!(matches!(err, CodecError::InvalidRect { ref frame, .. } if frame == "3"));
    }

    #[test]
    fn test_load_rejects_non_integer_frame_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"[{"id": 0, "timestamps": {"first": {"rect": {"start": [1, 1], "end": [5, 9]}}}}]"#,
        )
        .unwrap();
        assert!(matches!(load_units::<ObjectTrack>(&path), Err(CodecError::Json(_))));
    }

    #[test]
    fn test_save_path_naming() {
        let dir = tempfile::tempdir().unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap();

        let plain = save_path(dir.path(), None, DocumentFormat::Json, now);
        assert_eq!(plain.file_name().unwrap(), "save_2024-03-09_14-05-07.json");

        let tagged = save_path(dir.path(), Some("autosave"), DocumentFormat::Yaml, now);
        assert_eq!(tagged.file_name().unwrap(), "save_2024-03-09_14-05-07_autosave.yaml");

        std::fs::write(&plain, "{}").unwrap();
        let next = save_path(dir.path(), None, DocumentFormat::Json, now);
        assert_eq!(next.file_name().unwrap(), "save_2024-03-09_14-05-07-1.json");
    }
}
