/*
 * Copyright © 2025, the VisuSat authors. All rights reserved.
 *
 * The “VisuSat” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::{io::ErrorKind, path::{Path, PathBuf}};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use visusat_common::{datetime::{deserialize_optional_datetime_spec, iso_string}, fs::{files_in_dir, is_same_file}, is_none};

use crate::errors::{invalid_arg, Result, VisuSatAnimationError};
use crate::frame::{parse_frame_filename, Frame, FrameRejection};

/// optional constraints on which valid frames of a directory go into a sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSelection {
    #[serde(skip_serializing_if = "is_none")]
    pub sensor: Option<String>,

    #[serde(skip_serializing_if = "is_none")]
    pub channel: Option<String>,

    #[serde(deserialize_with = "deserialize_optional_datetime_spec", skip_serializing_if = "is_none")]
    pub start: Option<DateTime<Utc>>,

    #[serde(deserialize_with = "deserialize_optional_datetime_spec", skip_serializing_if = "is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl FrameSelection {
    pub fn check (&self)->Result<()> {
        if let (Some(start), Some(end)) = (&self.start, &self.end) {
            if end < start {
                return Err( invalid_arg( format!("selection end {} precedes start {}", iso_string(end), iso_string(start))))
            }
        }
        Ok(())
    }

    /// does the frame match sensor and channel, and lie within [start,end]
    pub fn matches (&self, frame: &Frame)->bool {
        self.sensor.as_ref().map_or( true, |s| *s == frame.sensor_tag) &&
        self.channel.as_ref().map_or( true, |c| *c == frame.channel_id) &&
        self.start.map_or( true, |t| frame.acquisition_start >= t) &&
        self.end.map_or( true, |t| frame.acquisition_end <= t)
    }
}

/// a directory entry that could not be used as a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFrame {
    pub path: PathBuf,
    #[serde(flatten)]
    pub reason: FrameRejection,
}

/// chronologically ordered frames of a directory, plus what was left out
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sequence {
    pub frames: Vec<Frame>,
    pub skipped: Vec<SkippedFrame>,
    pub excluded_count: usize,
}

impl Sequence {
    pub fn len (&self)->usize { self.frames.len() }
    pub fn is_empty (&self)->bool { self.frames.is_empty() }
    pub fn skipped_count (&self)->usize { self.skipped.len() }

    pub fn source_paths (&self)->Vec<PathBuf> {
        self.frames.iter().map( |f| f.source_path.clone()).collect()
    }
}

/// sort ascending by acquisition start, ties broken by filename
pub fn sort_frames (frames: &mut [Frame]) {
    frames.sort_by( |a,b| {
        a.acquisition_start.cmp( &b.acquisition_start).then_with( || a.file_name().cmp( b.file_name()))
    });
}

/// build the sequence for the regular files in `dir`. Entries that do not parse as frames are
/// logged and reported as skipped, valid frames not matching `selection` are only counted.
/// `ignore` is typically the output path of a previous run into the same directory
pub fn scan_sequence (dir: impl AsRef<Path>, selection: &FrameSelection, ignore: Option<&Path>)->Result<Sequence> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err( VisuSatAnimationError::NotFound( format!("input directory {dir:?}")) )
    }

    let paths = files_in_dir( &dir).map_err( |e| match e.kind() {
        ErrorKind::PermissionDenied | ErrorKind::NotFound => {
            VisuSatAnimationError::NotFound( format!("input directory {dir:?} not readable: {e}"))
        }
        _ => VisuSatAnimationError::IOError(e)
    })?;

    let mut seq = Sequence::default();

    for path in paths {
        if let Some(ignore) = ignore {
            if is_same_file( &path, ignore) {
                debug!("ignoring output file {path:?}");
                continue
            }
        }

        match parse_frame_filename( &path) {
            Ok(frame) => {
                if selection.matches( &frame) {
                    debug!("frame {:?}", frame.file_name());
                    seq.frames.push( frame)
                } else {
                    seq.excluded_count += 1
                }
            }
            Err(reason) => {
                warn!("skipping {path:?}: {reason}");
                seq.skipped.push( SkippedFrame { path, reason })
            }
        }
    }

    sort_frames( &mut seq.frames);
    seq.skipped.sort_by( |a,b| a.path.cmp( &b.path));

    info!("{dir:?}: {} frames, {} skipped, {} excluded", seq.len(), seq.skipped_count(), seq.excluded_count);
    Ok(seq)
}
