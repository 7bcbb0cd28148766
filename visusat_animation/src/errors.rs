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

use visusat_common::define_error;
use visusat_build::VisuSatBuildError;

pub type Result<T> = std::result::Result<T, VisuSatAnimationError>;

define_error!{ pub VisuSatAnimationError =
    NotFound(String) : "not found: {0}",
    InvalidArgument(String) : "invalid argument: {0}",
    EmptyInput(String) : "no valid frames in {0}",
    Encoding(String) : "encoding failed: {0}",
    IOError( #[from] std::io::Error) : "IO error: {0}",
    ImageError( #[from] visusat_image::VisuSatImageError) : "image error: {0}",
    BuildError( #[from] VisuSatBuildError) : "config error: {0}",
    SerdeError( #[from] serde_json::Error) : "serde error: {0}"
}

impl VisuSatAnimationError {
    /// process exit code for command line tools
    pub fn exit_code (&self)->u8 {
        use VisuSatAnimationError::*;
        match self {
            InvalidArgument(_) => 2,
            NotFound(_) | BuildError(VisuSatBuildError::ResourceNotFoundError(_)) => 3,
            EmptyInput(_) => 4,
            Encoding(_) => 5,
            _ => 1
        }
    }
}

pub fn invalid_arg (msg: impl ToString)->VisuSatAnimationError {
    VisuSatAnimationError::InvalidArgument( msg.to_string())
}

pub fn encoding_error (msg: impl ToString)->VisuSatAnimationError {
    VisuSatAnimationError::Encoding( msg.to_string())
}
