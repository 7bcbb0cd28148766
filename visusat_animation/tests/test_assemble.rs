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

use std::{fs::{self, File}, io::BufReader, path::{Path, PathBuf}};
use image::{codecs::gif::GifDecoder, AnimationDecoder, ImageBuffer, Luma, Rgba, RgbaImage};
use visusat_animation::*;

// run with "cargo test test_xx -- --nocapture"

const RED: Rgba<u8> = Rgba([255,0,0,255]);
const GREEN: Rgba<u8> = Rgba([0,255,0,255]);
const BLUE: Rgba<u8> = Rgba([0,0,255,255]);

fn write_frame (dir: &Path, name: &str, color: Rgba<u8>, w: u32, h: u32)->PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel( w, h, color).save( &path).unwrap();
    path
}

fn gif_frames (path: &Path)->Vec<RgbaImage> {
    let decoder = GifDecoder::new( BufReader::new( File::open( path).unwrap())).unwrap();
    decoder.into_frames().collect_frames().unwrap().into_iter().map( |f| f.into_buffer()).collect()
}

/// index of the strongest RGB channel of the center pixel
fn dominant_channel (img: &RgbaImage)->usize {
    let p = img.get_pixel( img.width()/2, img.height()/2);
    (0..3).max_by_key( |i| p[*i]).unwrap()
}

fn file_names (paths: &[PathBuf])->Vec<String> {
    paths.iter().map( |p| p.file_name().unwrap().to_string_lossy().to_string()).collect()
}

#[test]
fn test_chronological_order_with_bogus_file() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();

    // written out of order
    write_frame( input.path(), "A_20251022180006_20251022180923_35.png", BLUE, 16, 8);
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 16, 8);
    write_frame( input.path(), "A_20251022150006_20251022150923_35.png", GREEN, 16, 8);
    fs::write( input.path().join("bogus.txt"), "not a frame").unwrap();

    let out = output.path().join("movie.gif");
    let summary = assemble( input.path(), 2.0, &out, "image-loop").unwrap();

    assert_eq!( summary.included_count, 3);
    assert_eq!( summary.skipped_count, 1);
    assert_eq!( summary.excluded_count, 0);
    assert_eq!( file_names( &summary.frames), vec![
        "A_20251022120006_20251022120923_35.png",
        "A_20251022150006_20251022150923_35.png",
        "A_20251022180006_20251022180923_35.png",
    ]);
    assert_eq!( summary.skipped[0].reason, FrameRejection::NoMatch);

    let frames = gif_frames( &out);
    assert_eq!( frames.len(), 3);
    assert_eq!( frames.iter().map( dominant_channel).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn test_ties_broken_by_filename() {
    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "SEVIRI_20251022120000_20251022121500_ir108.png", GREEN, 8, 8);
    write_frame( input.path(), "FCI_20251022120000_20251022120923_ir105.png", RED, 8, 8);
    write_frame( input.path(), "ABI_20251022110000_20251022110500_13.png", BLUE, 8, 8);

    let out = input.path().join("out").join("movie.gif");
    let first = assemble( input.path(), 4.0, &out, "gif").unwrap();
    let second = assemble( input.path(), 4.0, &out, "gif").unwrap();

    let expected = vec![
        "ABI_20251022110000_20251022110500_13.png",
        "FCI_20251022120000_20251022120923_ir105.png",
        "SEVIRI_20251022120000_20251022121500_ir108.png",
    ];
    assert_eq!( file_names( &first.frames), expected);
    assert_eq!( first.frames, second.frames);
}

#[test]
fn test_rerun_into_source_dir_is_idempotent() {
    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);
    write_frame( input.path(), "A_20251022150006_20251022150923_35.png", GREEN, 8, 8);

    let out = input.path().join("movie.gif");
    let first = assemble( input.path(), 2.0, &out, "image-loop").unwrap();
    let second = assemble( input.path(), 2.0, &out, "image-loop").unwrap();

    assert_eq!( (first.included_count, first.skipped_count), (2, 0));
    assert_eq!( (second.included_count, second.skipped_count), (2, 0)); // previous output is not a skipped frame
    assert_eq!( first.frames, second.frames);
    assert_eq!( gif_frames( &out).len(), 2);
}

#[test]
fn test_empty_input() {
    let input = tempfile::tempdir().unwrap();
    fs::write( input.path().join("bogus.txt"), "not a frame").unwrap();
    fs::create_dir( input.path().join("A_20251022120006_20251022120923_35.png")).unwrap(); // dirs are no frames

    let out = input.path().join("movie.gif");
    let res = assemble( input.path(), 2.0, &out, "image-loop");
    assert!( matches!( res, Err(VisuSatAnimationError::EmptyInput(_))));
    assert!( !out.exists());
}

#[test]
fn test_invalid_arguments_before_fs_access() {
    let missing = Path::new("/this/directory/does/not/exist");
    let out = missing.join("movie.gif");

    for fps in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let res = assemble( missing, fps, &out, "image-loop");
        assert!( matches!( res, Err(VisuSatAnimationError::InvalidArgument(_))), "fps {fps}");
    }

    let res = assemble( missing, 2.0, &out, "avi");
    assert!( matches!( res, Err(VisuSatAnimationError::InvalidArgument(_))));
    assert!( !missing.exists());
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let res = assemble( dir.path().join("missing"), 2.0, dir.path().join("movie.gif"), "image-loop");
    let err = res.unwrap_err();
    assert!( matches!( err, VisuSatAnimationError::NotFound(_)));
    assert_eq!( err.exit_code(), 3);
}

#[test]
fn test_selection() {
    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);
    write_frame( input.path(), "A_20251022150006_20251022150923_35.png", GREEN, 8, 8);
    write_frame( input.path(), "A_20251022150006_20251022150923_38.png", BLUE, 8, 8);
    write_frame( input.path(), "A_20251022180006_20251022180923_35.png", BLUE, 8, 8);

    let mut opts = AnimationOptions::new( input.path(), input.path().join("movie.gif"), 2.0, AnimationFormat::ImageLoop);
    opts.selection = FrameSelection {
        channel: Some("35".to_string()),
        start: visusat_common::datetime::parse_datetime_spec("2025-10-22T13:00:00"),
        ..FrameSelection::default()
    };

    let summary = assemble_with( &opts).unwrap();
    assert_eq!( summary.included_count, 2);
    assert_eq!( summary.skipped_count, 0);
    assert_eq!( summary.excluded_count, 2);
    assert_eq!( file_names( &summary.frames), vec![
        "A_20251022150006_20251022150923_35.png",
        "A_20251022180006_20251022180923_35.png",
    ]);

    opts.selection.sensor = Some("B".to_string());
    assert!( matches!( assemble_with( &opts), Err(VisuSatAnimationError::EmptyInput(_))));
}

#[test]
fn test_mismatched_frame_sizes_are_resized() {
    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 20, 10);
    write_frame( input.path(), "A_20251022150006_20251022150923_35.png", GREEN, 10, 5);

    let out = input.path().join("movie.gif");
    assemble( input.path(), 1.0, &out, "image-loop").unwrap();

    let frames = gif_frames( &out);
    assert_eq!( frames.len(), 2);
    assert!( frames.iter().all( |f| f.dimensions() == (20,10)));
}

#[test]
fn test_raster_frames() {
    let input = tempfile::tempdir().unwrap();
    for (i,hour) in ["12", "15"].iter().enumerate() {
        let img: ImageBuffer<Luma<u16>,Vec<u16>> = ImageBuffer::from_fn( 12, 6, |x,_| Luma([ (x as u16 + i as u16) * 100 ]));
        img.save( input.path().join( format!("FCI_20251022{hour}0000_20251022{hour}0900_ir105.tif"))).unwrap();
    }

    let mut opts = AnimationOptions::new( input.path(), input.path().join("bt.gif"), 2.0, AnimationFormat::ImageLoop);
    opts.colormap = parse_colormap("viridis").unwrap();
    let summary = assemble_with( &opts).unwrap();
    assert_eq!( summary.included_count, 2);

    let frames = gif_frames( &summary.output_path);
    assert_eq!( frames.len(), 2);
    assert_eq!( frames[0].dimensions(), (12,6));
}

#[test]
fn test_caption_requires_font() {
    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);

    let mut opts = AnimationOptions::new( input.path(), input.path().join("movie.gif"), 2.0, AnimationFormat::ImageLoop);
    opts.caption = true;
    assert!( matches!( assemble_with( &opts), Err(VisuSatAnimationError::InvalidArgument(_))));

    opts.font = Some( input.path().join("missing.ttf"));
    assert!( matches!( assemble_with( &opts), Err(VisuSatAnimationError::InvalidArgument(_))));
    assert!( !input.path().join("movie.gif").exists());
}

#[test]
fn test_video_encoder_failure_leaves_no_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);

    let out = output.path().join("movie.mp4");
    let mut opts = AnimationOptions::new( input.path(), &out, 2.0, AnimationFormat::Video);
    opts.ffmpeg = "/nonexistent/bin/ffmpeg-for-visusat-tests".to_string();

    let err = assemble_with( &opts).unwrap_err();
    assert!( matches!( err, VisuSatAnimationError::Encoding(_)));
    assert_eq!( err.exit_code(), 5);
    assert!( !out.exists());
    assert_eq!( fs::read_dir( output.path()).unwrap().count(), 0); // temp file removed
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory() {
    use std::os::unix::fs::PermissionsExt;

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);

    fs::set_permissions( input.path(), fs::Permissions::from_mode( 0o000)).unwrap();
    if fs::read_dir( input.path()).is_ok() { // root can read anyway
        fs::set_permissions( input.path(), fs::Permissions::from_mode( 0o755)).unwrap();
        println!("directory permissions not enforced, skipping");
        return
    }

    let res = assemble( input.path(), 2.0, output.path().join("movie.gif"), "image-loop");
    fs::set_permissions( input.path(), fs::Permissions::from_mode( 0o755)).unwrap();

    let err = res.unwrap_err();
    assert!( matches!( err, VisuSatAnimationError::NotFound(_)), "{err:?}");
    assert_eq!( err.exit_code(), 3);
}

#[cfg(unix)]
#[test]
fn test_output_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let mode = |p: &Path| fs::metadata( p).unwrap().permissions().mode() & 0o777;

    let input = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 8, 8);

    let regular = input.path().join("regular.txt");
    fs::write( &regular, "x").unwrap();

    let out = input.path().join("movie.gif");
    assemble( input.path(), 2.0, &out, "image-loop").unwrap();
    assert_eq!( mode( &out), mode( &regular));

    // replacing an existing output keeps its mode
    fs::set_permissions( &out, fs::Permissions::from_mode( 0o640)).unwrap();
    assemble( input.path(), 2.0, &out, "image-loop").unwrap();
    assert_eq!( mode( &out), 0o640);
}

#[cfg(unix)]
#[test]
fn test_video_encoder_reports_ffmpeg_error() {
    use std::os::unix::fs::PermissionsExt;

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_frame( input.path(), "A_20251022120006_20251022120923_35.png", RED, 200, 200);
    write_frame( input.path(), "A_20251022150006_20251022150923_35.png", GREEN, 200, 200);

    // exits without reading its input, as ffmpeg does for an unknown codec
    let script = output.path().join("fake-ffmpeg.sh");
    fs::write( &script, "#!/bin/sh\necho \"Unknown encoder 'bogus'\" >&2\nexit 1\n").unwrap();
    fs::set_permissions( &script, fs::Permissions::from_mode( 0o755)).unwrap();

    let out = output.path().join("movie.mp4");
    let mut opts = AnimationOptions::new( input.path(), &out, 2.0, AnimationFormat::Video);
    opts.ffmpeg = script.to_string_lossy().to_string();
    opts.video_codec = "bogus".to_string();

    let err = assemble_with( &opts).unwrap_err();
    match &err {
        VisuSatAnimationError::Encoding(msg) => assert!( msg.contains("Unknown encoder 'bogus'"), "{msg}"),
        other => panic!("unexpected error {other:?}")
    }
    assert_eq!( err.exit_code(), 5);
    assert!( !out.exists());
}
