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

use serde::{Deserialize, Serialize};
use visusat_common::fs::EnvPathBuf;

pub const DEFAULT_CONFIG: &str = "animation.ron";

/// persistent defaults for animation assembly, normally loaded from `animation.ron`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub frame_rate: f64,
    pub format: String, // image-loop (gif) or video (mp4)
    pub loop_count: u16, // 0: forever
    pub colormap: String,
    pub clip_percentiles: (f64, f64),
    pub caption: bool,
    pub font: Option<EnvPathBuf>,
    pub ffmpeg: String,
    pub video_codec: String,
}

impl Default for AnimationConfig {
    fn default ()->Self {
        AnimationConfig {
            frame_rate: 2.0,
            format: "image-loop".to_string(),
            loop_count: 0,
            colormap: "blues".to_string(),
            clip_percentiles: (1.0, 99.0),
            caption: false,
            font: None,
            ffmpeg: "ffmpeg".to_string(),
            video_codec: "libx264".to_string(),
        }
    }
}
