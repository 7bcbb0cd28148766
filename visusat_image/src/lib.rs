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
#![allow(unused)]

//! frame pixel handling for VisuSat animations: decoding of regular images and single band
//! scientific rasters, value ranges, colormaps and captions. This mostly wraps the external
//! 'image', 'tiff' and 'imageproc' crates

use std::path::Path;
use image::{imageops::{self, FilterType}, RgbaImage};
use tracing::{debug, warn};
use visusat_common::fs::extension;

mod errors;
pub use errors::{Result, VisuSatImageError};

pub mod raster;
pub use raster::{Raster, ValueRange, read_tiff_raster};

pub mod colormap;
pub use colormap::Colormap;

pub mod caption;
pub use caption::{CaptionPainter, load_font, BAND_COLOR};

/// lower case file extensions we know how to turn into frames
pub const FRAME_EXTENSIONS: &[&str] = &["tif", "tiff", "png", "jpg", "jpeg", "gif", "bmp", "webp"];

pub fn is_supported_extension (ext: &str)->bool {
    let ext = ext.to_ascii_lowercase();
    FRAME_EXTENSIONS.contains( &ext.as_str())
}

pub fn is_tiff_extension (ext: &str)->bool {
    ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff")
}

/// decoded contents of a frame file: either displayable pixels or samples that still need a colormap
pub enum FramePixels {
    Image(RgbaImage),
    Raster(Raster),
}

pub fn read_frame_pixels<P: AsRef<Path>> (path: P)->Result<FramePixels> {
    let path = path.as_ref();
    let ext = extension( &path).unwrap_or("");

    if is_tiff_extension( ext) {
        if let raster::TiffKind::Raster = raster::tiff_kind( path)? {
            return Ok( FramePixels::Raster( read_tiff_raster( path)?) )
        }
    } else if !is_supported_extension( ext) {
        return Err( VisuSatImageError::InvalidImageFormat( format!("unsupported frame file: {path:?}")) )
    }

    let img = image::open( path)?;
    debug!("read {}x{} image from {path:?}", img.width(), img.height());
    Ok( FramePixels::Image( img.to_rgba8()) )
}

/// turn decoded frame contents into RGBA pixels. Rasters are mapped through `colormap`, normalized
/// to `range` (or their own min/max if there is no range)
pub fn render_frame (pixels: FramePixels, colormap: Colormap, range: Option<&ValueRange>)->RgbaImage {
    match pixels {
        FramePixels::Image(img) => img,
        FramePixels::Raster(r) => {
            let own_range;
            let range = match range {
                Some(range) => range,
                None => {
                    own_range = r.percentile_range( 0.0, 100.0).unwrap_or( ValueRange{ min: 0.0, max: 1.0 });
                    &own_range
                }
            };
            colormap.colorize( &r, range)
        }
    }
}

/// resize `img` to `width` x `height` if it has different dimensions
pub fn fit_to_dimensions (img: RgbaImage, width: u32, height: u32)->Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err( VisuSatImageError::InvalidDimensions( format!("{width}x{height}")) )
    }

    if img.dimensions() == (width, height) {
        Ok(img)
    } else {
        warn!("resizing {}x{} frame to {width}x{height}", img.width(), img.height());
        Ok( imageops::resize( &img, width, height, FilterType::Lanczos3) )
    }
}

/// crop to even width and height as required by yuv420p video encoding
pub fn crop_to_even (img: RgbaImage)->RgbaImage {
    let (w,h) = img.dimensions();
    let (we,he) = (w & !1, h & !1);
    if (we,he) == (w,h) || we == 0 || he == 0 {
        img
    } else {
        imageops::crop_imm( &img, 0, 0, we, he).to_image()
    }
}
