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

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::raster::{Raster, ValueRange};

/// the colormaps we can render rasters with. Names follow matplotlib conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Colormap {
    Gray,
    #[default]
    Blues,
    Viridis,
    #[strum(serialize = "spectral-r", serialize = "spectral_r")]
    #[serde(alias = "spectral_r")]
    SpectralR,
}

const GRAY: &[(f32,[u8;3])] = &[
    (0.0, [0,0,0]),
    (1.0, [255,255,255]),
];

const BLUES: &[(f32,[u8;3])] = &[
    (0.000, [247,251,255]),
    (0.125, [222,235,247]),
    (0.250, [198,219,239]),
    (0.375, [158,202,225]),
    (0.500, [107,174,214]),
    (0.625, [66,146,198]),
    (0.750, [33,113,181]),
    (0.875, [8,81,156]),
    (1.000, [8,48,107]),
];

const VIRIDIS: &[(f32,[u8;3])] = &[
    (0.00, [68,1,84]),
    (0.25, [59,82,139]),
    (0.50, [33,145,140]),
    (0.75, [94,201,98]),
    (1.00, [253,231,37]),
];

// stored in matplotlib's "Spectral" order, looked up reversed
const SPECTRAL: &[(f32,[u8;3])] = &[
    (0.0, [158,1,66]),
    (0.1, [213,62,79]),
    (0.2, [244,109,67]),
    (0.3, [253,174,97]),
    (0.4, [254,224,139]),
    (0.5, [255,255,191]),
    (0.6, [230,245,152]),
    (0.7, [171,221,164]),
    (0.8, [102,194,165]),
    (0.9, [50,136,189]),
    (1.0, [94,79,162]),
];

/// masked (fill value or NaN) samples are rendered fully transparent
pub const TRANSPARENT: Rgba<u8> = Rgba([0,0,0,0]);

impl Colormap {
    /// opaque color for a normalized value `t` in [0,1]
    pub fn color (&self, t: f32)->Rgba<u8> {
        let t = if t.is_nan() { 0.0 } else { t.clamp( 0.0, 1.0) };
        let [r,g,b] = match self {
            Colormap::Gray => interpolate( GRAY, t),
            Colormap::Blues => interpolate( BLUES, t),
            Colormap::Viridis => interpolate( VIRIDIS, t),
            Colormap::SpectralR => interpolate( SPECTRAL, 1.0 - t),
        };
        Rgba([r,g,b,255])
    }

    /// render a raster into an RGBA image, normalizing valid samples to `range`
    pub fn colorize (&self, raster: &Raster, range: &ValueRange)->RgbaImage {
        RgbaImage::from_fn( raster.width, raster.height, |x,y| {
            let v = raster.get(x,y);
            if raster.is_valid(v) { self.color( range.normalize(v)) } else { TRANSPARENT }
        })
    }
}

fn interpolate (stops: &[(f32,[u8;3])], t: f32)->[u8;3] {
    for w in stops.windows(2) {
        let (t0,c0) = w[0];
        let (t1,c1) = w[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            return [ lerp( c0[0], c1[0], f), lerp( c0[1], c1[1], f), lerp( c0[2], c1[2], f) ]
        }
    }
    stops[stops.len()-1].1
}

fn lerp (a: u8, b: u8, f: f32)->u8 {
    (a as f32 + (b as f32 - a as f32) * f).round().clamp( 0.0, 255.0) as u8
}
