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

use std::{fmt, path::{Path, PathBuf}};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use visusat_common::datetime::{iso_string, parse_compact_dtg};
use visusat_image::is_supported_extension;

lazy_static! {
    // <sensor_tag>_<YYYYMMDDhhmmss>_<YYYYMMDDhhmmss>_<channel_id>.<ext>
    // sensor tags can contain '_', channel ids can't
    static ref FILENAME_RE: Regex = Regex::new(r#"^(.+)_(\d{14})_(\d{14})_([^_.]+)\.([^.]+)$"#).unwrap();
}

/// one still image of an animation with the metadata encoded in its filename
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub source_path: PathBuf,
    pub sensor_tag: String,
    pub acquisition_start: DateTime<Utc>,
    pub acquisition_end: DateTime<Utc>,
    pub channel_id: String,
    pub extension: String, // lower case
}

impl Frame {
    pub fn file_name (&self)->&str {
        self.source_path.file_name().and_then( |s| s.to_str()).unwrap_or("")
    }

    pub fn caption (&self)->String {
        format!("{} ch{}  {} -> {}", self.sensor_tag, self.channel_id,
            iso_string( &self.acquisition_start), iso_string( &self.acquisition_end))
    }
}

/// why a directory entry did not make it into a sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FrameRejection {
    NoMatch,
    NonUtf8Name,
    InvalidTimestamp(String),
    ReversedInterval,
    UnsupportedExtension(String),
}

impl fmt::Display for FrameRejection {
    fn fmt (&self, f: &mut fmt::Formatter<'_>)->fmt::Result {
        match self {
            FrameRejection::NoMatch => write!(f, "filename does not match <sensor>_<start>_<end>_<channel>.<ext>"),
            FrameRejection::NonUtf8Name => write!(f, "filename is not valid UTF-8"),
            FrameRejection::InvalidTimestamp(s) => write!(f, "invalid timestamp '{s}'"),
            FrameRejection::ReversedInterval => write!(f, "acquisition end precedes start"),
            FrameRejection::UnsupportedExtension(ext) => write!(f, "unsupported image type '{ext}'"),
        }
    }
}

pub type FrameParse = std::result::Result<Frame, FrameRejection>;

/// parse the frame metadata from the filename of `path`. This does not access the file
pub fn parse_frame_filename (path: impl AsRef<Path>)->FrameParse {
    let path = path.as_ref();
    let filename = match path.file_name() {
        Some(name) => name.to_str().ok_or( FrameRejection::NonUtf8Name)?,
        None => return Err( FrameRejection::NoMatch)
    };

    let cap = FILENAME_RE.captures( filename).ok_or( FrameRejection::NoMatch)?;
    let acquisition_start = parse_compact_dtg( &cap[2]).ok_or_else( || FrameRejection::InvalidTimestamp( cap[2].to_string()))?;
    let acquisition_end = parse_compact_dtg( &cap[3]).ok_or_else( || FrameRejection::InvalidTimestamp( cap[3].to_string()))?;
    if acquisition_end < acquisition_start {
        return Err( FrameRejection::ReversedInterval)
    }

    let extension = cap[5].to_ascii_lowercase();
    if !is_supported_extension( &extension) {
        return Err( FrameRejection::UnsupportedExtension( extension))
    }

    Ok( Frame {
        source_path: path.to_path_buf(),
        sensor_tag: cap[1].to_string(),
        acquisition_start,
        acquisition_end,
        channel_id: cap[4].to_string(),
        extension,
    })
}
