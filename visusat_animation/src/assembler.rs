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

use std::{path::{Path, PathBuf}, str::FromStr};
use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info};
use visusat_common::fs::{ensure_writable_dir, parent_dir};
use visusat_image::{CaptionPainter, Colormap};

use crate::config::AnimationConfig;
use crate::encoder::{encode_atomically, AnimationEncoder, FfmpegVideoEncoder, GifAnimationEncoder, LoopPolicy};
use crate::errors::{invalid_arg, Result, VisuSatAnimationError};
use crate::render::FrameRenderer;
use crate::sequence::{scan_sequence, FrameSelection, SkippedFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum AnimationFormat {
    /// looping GIF
    #[strum(to_string = "image-loop", serialize = "gif")]
    #[serde(rename = "image-loop")]
    ImageLoop,

    /// H.264 MP4
    #[strum(to_string = "video", serialize = "mp4")]
    #[serde(rename = "video")]
    Video,
}

impl AnimationFormat {
    pub fn parse (s: &str)->Result<Self> {
        AnimationFormat::from_str( s.trim()).map_err( |_| invalid_arg( format!("unsupported format '{s}' (use image-loop|gif|video|mp4)")))
    }
}

pub fn parse_colormap (s: &str)->Result<Colormap> {
    Colormap::from_str( s.trim()).map_err( |_| invalid_arg( format!("unknown colormap '{s}' (use gray|blues|viridis|spectral-r)")))
}

/// everything that controls a single animation run
#[derive(Debug, Clone)]
pub struct AnimationOptions {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub frame_rate: f64,
    pub format: AnimationFormat,
    pub loop_policy: LoopPolicy,
    pub colormap: Colormap,
    pub clip_percentiles: (f64, f64),
    pub selection: FrameSelection,
    pub caption: bool,
    pub font: Option<PathBuf>,
    pub ffmpeg: String,
    pub video_codec: String,
}

impl AnimationOptions {
    pub fn new (input_dir: impl AsRef<Path>, output_path: impl AsRef<Path>, frame_rate: f64, format: AnimationFormat)->Self {
        let config = AnimationConfig::default();
        AnimationOptions {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            frame_rate,
            format,
            loop_policy: LoopPolicy::from_count( config.loop_count),
            colormap: Colormap::default(),
            clip_percentiles: config.clip_percentiles,
            selection: FrameSelection::default(),
            caption: config.caption,
            font: None,
            ffmpeg: config.ffmpeg,
            video_codec: config.video_codec,
        }
    }

    pub fn from_config (config: &AnimationConfig, input_dir: impl AsRef<Path>, output_path: impl AsRef<Path>)->Result<Self> {
        Ok( AnimationOptions {
            input_dir: input_dir.as_ref().to_path_buf(),
            output_path: output_path.as_ref().to_path_buf(),
            frame_rate: config.frame_rate,
            format: AnimationFormat::parse( &config.format)?,
            loop_policy: LoopPolicy::from_count( config.loop_count),
            colormap: parse_colormap( &config.colormap)?,
            clip_percentiles: config.clip_percentiles,
            selection: FrameSelection::default(),
            caption: config.caption,
            font: config.font.as_ref().map( |p| p.to_path_buf()),
            ffmpeg: config.ffmpeg.clone(),
            video_codec: config.video_codec.clone(),
        })
    }

    /// argument checks that do not require filesystem access
    pub fn validate (&self)->Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err( invalid_arg( format!("frame rate has to be a positive number, got {}", self.frame_rate)))
        }

        let (low, high) = self.clip_percentiles;
        if !(0.0 <= low && low < high && high <= 100.0) {
            return Err( invalid_arg( format!("invalid clip percentiles ({low}, {high})")))
        }

        if self.caption && self.font.is_none() {
            return Err( invalid_arg("captions require a font"))
        }

        if self.output_path.file_name().is_none() {
            return Err( invalid_arg( format!("output path {:?} is not a file name", self.output_path)))
        }

        self.selection.check()
    }

    fn encoder (&self)->Box<dyn AnimationEncoder> {
        match self.format {
            AnimationFormat::ImageLoop => Box::new( GifAnimationEncoder { frame_rate: self.frame_rate, loop_policy: self.loop_policy }),
            AnimationFormat::Video => {
                if self.loop_policy != LoopPolicy::Infinite {
                    debug!("loop policy {:?} does not apply to video output", self.loop_policy);
                }
                Box::new( FfmpegVideoEncoder { ffmpeg: self.ffmpeg.clone(), video_codec: self.video_codec.clone(), frame_rate: self.frame_rate })
            }
        }
    }
}

/// the result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct AnimationSummary {
    pub output_path: PathBuf,
    pub format: AnimationFormat,
    pub frame_rate: f64,
    pub included_count: usize,
    pub skipped_count: usize,
    pub excluded_count: usize,
    pub frames: Vec<PathBuf>,
    pub skipped: Vec<SkippedFrame>,
}

/// assemble the time-stamped images in `directory` into an animation at `output_path`.
/// `format` is one of "image-loop" (GIF) or "video" (MP4)
pub fn assemble (directory: impl AsRef<Path>, frame_rate: f64, output_path: impl AsRef<Path>, format: &str)->Result<AnimationSummary> {
    let format = AnimationFormat::parse( format)?;
    assemble_with( &AnimationOptions::new( directory, output_path, frame_rate, format))
}

pub fn assemble_with (opts: &AnimationOptions)->Result<AnimationSummary> {
    opts.validate()?;

    let seq = scan_sequence( &opts.input_dir, &opts.selection, Some( &opts.output_path))?;
    if seq.is_empty() {
        return Err( VisuSatAnimationError::EmptyInput( format!("{:?} ({} skipped, {} excluded)",
            opts.input_dir, seq.skipped_count(), seq.excluded_count)))
    }

    let caption = match (&opts.font, opts.caption) {
        (Some(font), true) => Some( CaptionPainter::from_path( font).map_err( |e| invalid_arg( format!("font {font:?}: {e}")))?),
        _ => None
    };

    ensure_writable_dir( parent_dir( &opts.output_path))?;

    let value_range = FrameRenderer::compute_value_range( &seq.frames, opts.clip_percentiles)?;
    let renderer = FrameRenderer::new( opts.colormap, value_range, caption);
    let mut frames = renderer.frames( &seq.frames);

    let n = encode_atomically( opts.encoder().as_ref(), &mut frames, &opts.output_path)?;
    info!("wrote {} with {n} frames at {} fps", opts.output_path.display(), opts.frame_rate);

    Ok( AnimationSummary {
        output_path: opts.output_path.clone(),
        format: opts.format,
        frame_rate: opts.frame_rate,
        included_count: n,
        skipped_count: seq.skipped_count(),
        excluded_count: seq.excluded_count,
        frames: seq.source_paths(),
        skipped: seq.skipped,
    })
}
