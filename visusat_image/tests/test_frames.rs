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

use std::{fs::{self, File}, path::{Path, PathBuf}};
use image::{ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use tiff::{encoder::{colortype, TiffEncoder}, tags::Tag};
use visusat_image::*;

// run with "cargo test test_xx -- --nocapture"

fn write_float_tiff (path: &Path, w: u32, h: u32, data: &[f32], nodata: Option<&str>) {
    let file = File::create( path).unwrap();
    let mut tiff = TiffEncoder::new( file).unwrap();
    let mut img = tiff.new_image::<colortype::Gray32Float>( w, h).unwrap();
    if let Some(nodata) = nodata {
        img.encoder().write_tag( Tag::Unknown( raster::GDAL_NODATA_TAG), nodata).unwrap();
    }
    img.write_data( data).unwrap();
}

#[test]
fn test_read_png_frame() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.png");
    RgbImage::from_pixel( 4, 3, Rgb([10,20,30])).save( &path).unwrap();

    match read_frame_pixels( &path).unwrap() {
        FramePixels::Image(img) => {
            assert_eq!( img.dimensions(), (4,3));
            assert_eq!( *img.get_pixel(0,0), Rgba([10,20,30,255]));
        }
        FramePixels::Raster(_) => panic!("png should not be a raster")
    }
}

#[test]
fn test_read_16bit_tiff_as_raster() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.tif");
    let img: ImageBuffer<Luma<u16>,Vec<u16>> = ImageBuffer::from_fn( 3, 2, |x,y| Luma([ (x + 3*y) as u16 * 1000 ]));
    img.save( &path).unwrap();

    match read_frame_pixels( &path).unwrap() {
        FramePixels::Raster(r) => {
            assert_eq!( (r.width, r.height), (3,2));
            assert_eq!( r.get(2,1), 5000.0);
        }
        FramePixels::Image(_) => panic!("16 bit gray tiff should be a raster")
    }
}

#[test]
fn test_float_tiff_nodata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bt.tif");
    write_float_tiff( &path, 2, 2, &[ 250.0, -999.0, 260.0, f32::NAN], Some("-999"));

    let r = read_tiff_raster( &path).unwrap();
    assert_eq!( r.fill_value, Some(-999.0));
    assert_eq!( r.valid_values(), vec![250.0, 260.0]);

    let range = r.percentile_range( 0.0, 100.0).unwrap();
    let rgba = render_frame( FramePixels::Raster(r), Colormap::Gray, Some(&range));
    assert_eq!( *rgba.get_pixel(0,0), Rgba([0,0,0,255]));
    assert_eq!( rgba.get_pixel(1,0)[3], 0); // masked
    assert_eq!( *rgba.get_pixel(0,1), Rgba([255,255,255,255]));
    assert_eq!( rgba.get_pixel(1,1)[3], 0); // NaN
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write( &path, "not an image").unwrap();
    assert!( matches!( read_frame_pixels( &path), Err(VisuSatImageError::InvalidImageFormat(_))));
}

#[test]
fn test_fit_and_crop() {
    let img = image::RgbaImage::from_pixel( 5, 3, Rgba([1,2,3,255]));
    let fitted = fit_to_dimensions( img.clone(), 10, 6).unwrap();
    assert_eq!( fitted.dimensions(), (10,6));
    assert_eq!( crop_to_even( img).dimensions(), (4,2));
    assert!( fit_to_dimensions( fitted, 0, 6).is_err());
}

#[test]
fn test_missing_font() {
    let dir = tempfile::tempdir().unwrap();
    assert!( matches!( load_font( dir.path().join("nope.ttf")), Err(VisuSatImageError::IllegalArgument(_))));
}

const FONT_DIRS: &[&str] = &["/usr/share/fonts", "/usr/local/share/fonts", "/Library/Fonts", "/System/Library/Fonts"];

/// first TrueType font found under the usual system font directories
fn find_system_font ()->Option<PathBuf> {
    fn find_ttf (dir: &Path, depth: usize)->Option<PathBuf> {
        let mut entries: Vec<PathBuf> = fs::read_dir( dir).ok()?.filter_map( |e| e.ok().map( |e| e.path())).collect();
        entries.sort();
        for path in &entries {
            if path.extension().is_some_and( |ext| ext.eq_ignore_ascii_case("ttf")) && load_font( path).is_ok() {
                return Some( path.clone())
            }
        }
        if depth > 0 {
            entries.iter().filter( |p| p.is_dir()).find_map( |p| find_ttf( p, depth-1))
        } else {
            None
        }
    }
    FONT_DIRS.iter().find_map( |d| find_ttf( Path::new(d), 4))
}

#[test]
fn test_caption_band() {
    let Some(font) = find_system_font() else {
        println!("no system TrueType font found, skipping");
        return
    };
    println!("using font {font:?}");

    let frame_color = Rgba([255,255,255,255]);
    let mut img = RgbaImage::from_pixel( 200, 120, frame_color);
    let painter = CaptionPainter::from_path( &font).unwrap();
    painter.draw( &mut img, "X");

    // band spans the full width at the top, text is drawn on top of it
    assert_eq!( *img.get_pixel( 0, 0), BAND_COLOR);
    assert_eq!( *img.get_pixel( 199, 1), BAND_COLOR);
    assert!( (0..40).any( |x| (0..20).any( |y| *img.get_pixel( x, y) != BAND_COLOR)));

    // the rest of the frame is untouched
    assert_eq!( *img.get_pixel( 100, 119), frame_color);
    assert_eq!( *img.get_pixel( 0, 60), frame_color);
}
