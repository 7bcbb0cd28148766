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

//! assembly of directories with time-stamped satellite images into animations. Input files follow
//! the `<sensor_tag>_<start>_<end>_<channel_id>.<ext>` naming scheme, e.g.
//! `FCIL1HRFI_20251022120006_20251022120923_35.tif`, and are played in order of acquisition time

visusat_build::define_load_config!{}

mod errors;
pub use errors::*;

pub mod frame;
pub use frame::{parse_frame_filename, Frame, FrameParse, FrameRejection};

pub mod sequence;
pub use sequence::{scan_sequence, sort_frames, FrameSelection, Sequence, SkippedFrame};

pub mod encoder;
pub use encoder::{AnimationEncoder, FfmpegVideoEncoder, GifAnimationEncoder, LoopPolicy};

pub mod render;
pub use render::FrameRenderer;

pub mod config;
pub use config::AnimationConfig;

mod assembler;
pub use assembler::{assemble, assemble_with, parse_colormap, AnimationFormat, AnimationOptions, AnimationSummary};
