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

use image::RgbaImage;
use tracing::{debug, info};
use visusat_image::{fit_to_dimensions, is_tiff_extension, read_frame_pixels, render_frame, CaptionPainter, Colormap, FramePixels, ValueRange};

use crate::errors::{encoding_error, Result};
use crate::frame::Frame;

/// turns frames into equally sized RGBA images. Holds the state that has to be shared by all
/// frames of an animation: value range, colormap and caption font
pub struct FrameRenderer {
    pub colormap: Colormap,
    pub value_range: Option<ValueRange>,
    caption: Option<CaptionPainter>,
}

impl FrameRenderer {
    pub fn new (colormap: Colormap, value_range: Option<ValueRange>, caption: Option<CaptionPainter>)->Self {
        FrameRenderer { colormap, value_range, caption }
    }

    /// min of the low and max of the high percentiles over all raster frames, or None if there are no rasters
    pub fn compute_value_range (frames: &[Frame], clip_percentiles: (f64,f64))->Result<Option<ValueRange>> {
        let (low, high) = clip_percentiles;
        let mut range: Option<ValueRange> = None;

        for frame in frames.iter().filter( |f| is_tiff_extension( &f.extension)) {
            let pixels = read_frame_pixels( &frame.source_path)
                .map_err( |e| encoding_error( format!("{:?}: {e}", frame.source_path)))?;

            if let FramePixels::Raster(raster) = pixels {
                if let Some(r) = raster.percentile_range( low, high) {
                    range = Some( range.map_or( r, |acc| acc.merge(&r)));
                }
            }
        }

        if let Some(r) = &range {
            info!("raster value range [{}, {}] (percentiles {low}/{high})", r.min, r.max);
        }
        Ok(range)
    }

    /// decode, colorize, resize to `dims` (if given) and caption a single frame
    pub fn render (&self, frame: &Frame, dims: Option<(u32,u32)>)->Result<RgbaImage> {
        let to_encoding_err = |e: visusat_image::VisuSatImageError| encoding_error( format!("{:?}: {e}", frame.source_path));

        let pixels = read_frame_pixels( &frame.source_path).map_err( to_encoding_err)?;
        let mut img = render_frame( pixels, self.colormap, self.value_range.as_ref());
        if let Some((w,h)) = dims {
            img = fit_to_dimensions( img, w, h).map_err( to_encoding_err)?;
        }

        if let Some(painter) = &self.caption {
            painter.draw( &mut img, &frame.caption());
        }

        debug!("rendered {}", frame.file_name());
        Ok(img)
    }

    /// lazily rendered frames in sequence order, all with the dimensions of the first one
    pub fn frames<'a> (&'a self, frames: &'a [Frame])->impl Iterator<Item=Result<RgbaImage>> + 'a {
        let mut dims: Option<(u32,u32)> = None;

        frames.iter().map( move |frame| {
            let img = self.render( frame, dims)?;
            if dims.is_none() {
                dims = Some( img.dimensions());
            }
            Ok(img)
        })
    }
}
