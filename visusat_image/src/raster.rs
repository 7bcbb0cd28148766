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

use std::{fs::File, io::BufReader, path::Path};
use tiff::{decoder::{Decoder, DecodingResult}, tags::Tag, ColorType};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, VisuSatImageError};

/// GDAL stores the fill value of a band as an ASCII number in this private TIFF tag
pub const GDAL_NODATA_TAG: u16 = 42113;

/// a single band of scientific samples (e.g. brightness temperatures or reflectances) as read
/// from a GeoTIFF. Values equal to `fill_value` and NaNs are not valid samples
#[derive(Debug, Clone)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
    pub fill_value: Option<f32>,
}

impl Raster {
    pub fn new (width: u32, height: u32, data: Vec<f32>, fill_value: Option<f32>)->Result<Self> {
        if data.len() != (width as usize) * (height as usize) {
            return Err( VisuSatImageError::InvalidDimensions( format!("{} samples for {width}x{height} raster", data.len())) )
        }
        Ok( Raster { width, height, data, fill_value } )
    }

    pub fn is_valid (&self, v: f32)->bool {
        !v.is_nan() && self.fill_value.map_or( true, |fv| v != fv)
    }

    pub fn valid_values (&self)->Vec<f32> {
        self.data.iter().copied().filter( |v| self.is_valid(*v)).collect()
    }

    pub fn get (&self, x: u32, y: u32)->f32 {
        self.data[ (y as usize) * (self.width as usize) + (x as usize)]
    }

    /// low/high percentiles of the valid samples, or None if there are no valid samples
    pub fn percentile_range (&self, low_pct: f64, high_pct: f64)->Option<ValueRange> {
        let mut values = self.valid_values();
        if values.is_empty() { return None }

        values.sort_by( |a,b| a.total_cmp(b));
        let min = percentile( &values, low_pct);
        let max = percentile( &values, high_pct);
        Some( ValueRange { min, max } )
    }
}

/// linearly interpolated percentile of already sorted values
pub fn percentile (sorted: &[f32], pct: f64)->f32 {
    match sorted.len() {
        0 => f32::NAN,
        1 => sorted[0],
        n => {
            let pos = (pct.clamp( 0.0, 100.0) / 100.0) * (n - 1) as f64;
            let i = pos.floor() as usize;
            let frac = (pos - i as f64) as f32;
            if i + 1 < n {
                sorted[i] + (sorted[i+1] - sorted[i]) * frac
            } else {
                sorted[n-1]
            }
        }
    }
}

/// the value interval that gets mapped onto a colormap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// extend to cover another range (min of mins, max of maxes)
    pub fn merge (&self, other: &ValueRange)->ValueRange {
        ValueRange { min: self.min.min( other.min), max: self.max.max( other.max) }
    }

    /// normalized position of `v` within the range, clamped to [0,1]. Degenerate ranges map to 0
    pub fn normalize (&self, v: f32)->f32 {
        let span = self.max - self.min;
        if span > 0.0 && span.is_finite() {
            ((v - self.min) / span).clamp( 0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// what a TIFF file holds as far as rendering is concerned
pub enum TiffKind {
    /// 8-bit gray/RGB(A) pixels that can be decoded as a regular image
    Image,
    /// single band of 16/32/64 bit samples that needs a colormap
    Raster,
}

pub fn tiff_kind<P: AsRef<Path>> (path: P)->Result<TiffKind> {
    let mut decoder = Decoder::new( BufReader::new( File::open( path.as_ref())?))?;
    Ok( kind_of( decoder.colortype()?) )
}

fn kind_of (color_type: ColorType)->TiffKind {
    match color_type {
        ColorType::Gray(8) | ColorType::GrayA(8) | ColorType::RGB(8) | ColorType::RGBA(8) => TiffKind::Image,
        ColorType::Gray(_) | ColorType::Multiband{..} => TiffKind::Raster,
        _ => TiffKind::Image // let the image crate sort out (or reject) the rest
    }
}

/// read the first band of a TIFF file as a [`Raster`], picking up the GDAL fill value if there is one
pub fn read_tiff_raster<P: AsRef<Path>> (path: P)->Result<Raster> {
    let path = path.as_ref();
    let mut decoder = Decoder::new( BufReader::new( File::open( path)?))?;
    let (width, height) = decoder.dimensions()?;

    let samples_per_pixel = match decoder.colortype()? {
        ColorType::Gray(_) => 1,
        ColorType::Multiband{ num_samples, .. } => num_samples as usize, // chunky layout, we only use band 1
        other => return Err( VisuSatImageError::InvalidImageFormat( format!("not a single band raster: {other:?}")) )
    };

    let fill_value = decoder.get_tag_ascii_string( Tag::Unknown(GDAL_NODATA_TAG)).ok()
        .and_then( |s| s.trim_matches( |c: char| c.is_whitespace() || c == '\0').parse::<f32>().ok());

    let data = match decoder.read_image()? {
        DecodingResult::U8(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::U16(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::U32(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::U64(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::I8(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::I16(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::I32(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::I64(v) => first_band( v, samples_per_pixel, |x| x as f32),
        DecodingResult::F32(v) => first_band( v, samples_per_pixel, |x| x),
        DecodingResult::F64(v) => first_band( v, samples_per_pixel, |x| x as f32),
        #[allow(unreachable_patterns)]
        _ => return Err( VisuSatImageError::InvalidImageFormat( format!("unsupported sample format in {path:?}")) )
    };

    debug!("read {width}x{height} raster from {path:?} (fill value: {fill_value:?})");
    Raster::new( width, height, data, fill_value)
}

fn first_band<T: Copy> (samples: Vec<T>, stride: usize, f: impl Fn(T)->f32)->Vec<f32> {
    samples.into_iter().step_by( stride.max(1)).map(f).collect()
}
