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

pub type Result<T> = std::result::Result<T, VisuSatImageError>;

define_error!{ pub VisuSatImageError =
    ImageError(#[from] image::ImageError) : "Image error {0}",
    IOError(#[from] std::io::Error) : "IO error: {0}",
    TiffError(#[from] tiff::TiffError) : "Tiff error: {0}",
    InvalidImageFormat(String) : "invalid image format: {0}",
    InvalidFont( #[from] ab_glyph::InvalidFont) : "Invalid font error: {0}",
    InvalidDimensions(String) : "invalid dimension error: {0}",
    IllegalArgument(String) : "illegal argument: {0}"
}
