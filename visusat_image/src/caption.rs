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

use std::path::Path;
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::{drawing::{draw_filled_rect_mut, draw_text_mut, text_size}, rect::Rect};
use visusat_common::fs::filepath_contents;

use crate::errors::{Result, VisuSatImageError};

/// background of the caption band
pub const BAND_COLOR: Rgba<u8> = Rgba([0,0,0,255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255,255,255,255]);
const MIN_FONT_PX: f32 = 12.0;
const MARGIN: i32 = 4;

pub fn load_font<P: AsRef<Path>> (path: P)->Result<FontVec> {
    let path = path.as_ref();
    if !path.is_file() {
        Err( VisuSatImageError::IllegalArgument( format!("font not found: {path:?}")) )
    } else {
        let data = filepath_contents( &path)?;
        Ok( FontVec::try_from_vec( data)? )
    }
}

/// caption renderer holding the loaded font. Text height scales with the frame height
pub struct CaptionPainter {
    font: FontVec,
}

impl CaptionPainter {
    pub fn new (font: FontVec)->Self {
        CaptionPainter { font }
    }

    pub fn from_path<P: AsRef<Path>> (path: P)->Result<Self> {
        Ok( CaptionPainter::new( load_font(path)?) )
    }

    pub fn scale_for (&self, img_height: u32)->PxScale {
        PxScale::from( (img_height as f32 / 30.0).max( MIN_FONT_PX))
    }

    /// draw `text` top-left on a dark band spanning the frame width
    pub fn draw (&self, img: &mut RgbaImage, text: &str) {
        let (w,h) = img.dimensions();
        if w == 0 || h == 0 || text.is_empty() { return }

        let scale = self.scale_for(h);
        let (_, text_h) = text_size( scale, &self.font, text);
        let band_h = (text_h as i32 + 2*MARGIN).clamp( 1, h as i32) as u32;

        draw_filled_rect_mut( img, Rect::at(0,0).of_size( w, band_h), BAND_COLOR);
        draw_text_mut( img, TEXT_COLOR, MARGIN, MARGIN, scale, &self.font, text);
    }
}
