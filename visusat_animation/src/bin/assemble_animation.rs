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

use std::{path::PathBuf, process::ExitCode};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing_subscriber::EnvFilter;
use visusat_build::VisuSatBuildError;
use visusat_common::{define_cli, datetime::{iso_string, parse_utc_datetime_arg}, fs::path_to_lossy_string};
use visusat_animation::{
    assemble_with, load_config, parse_colormap, scan_sequence, AnimationConfig, AnimationFormat, AnimationOptions,
    AnimationSummary, FrameSelection, LoopPolicy, Sequence, VisuSatAnimationError, config::DEFAULT_CONFIG
};

define_cli! { ARGS [about="assemble_animation - turn a directory of time-stamped satellite images into a GIF or MP4 animation"] =
    input_dir: String [help="directory with <sensor>_<start>_<end>_<channel>.<ext> image files"],
    output_path: String [help="animation file to write"],

    fps: Option<f64> [help="frames per second", long],
    format: Option<String> [help="output format: image-loop (gif) or video (mp4)", long],
    loops: Option<u16> [help="number of GIF loops, 0 = forever", long],
    colormap: Option<String> [help="colormap for single band rasters: gray, blues, viridis, spectral-r", long],
    channel: Option<String> [help="only use frames of this channel", long],
    sensor: Option<String> [help="only use frames of this sensor tag", long],
    start: Option<DateTime<Utc>> [help="only use frames starting at or after this time (ISO or YYYYMMDD[hhmmss])", long, value_parser=parse_utc_datetime_arg],
    end: Option<DateTime<Utc>> [help="only use frames ending at or before this time (ISO or YYYYMMDD[hhmmss])", long, value_parser=parse_utc_datetime_arg],
    caption: bool [help="draw sensor, channel and acquisition interval onto each frame", long],
    font: Option<String> [help="TrueType font file for captions", long],
    config: Option<String> [help="animation config file (RON)", long],
    dry_run: bool [help="only list the frames in order, do not write output", long],
    json: bool [help="print results as JSON", long]
}

fn main()->ExitCode {
    visusat_build::set_bin_context!();
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env()) // use RUST_LOG to set max level
        .with_writer( std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            let code = e.downcast_ref::<VisuSatAnimationError>().map_or( 1, |e| e.exit_code());
            ExitCode::from( code)
        }
    }
}

fn run()->Result<()> {
    let config = get_config()?;
    let opts = get_options( &config)?;

    if ARGS.dry_run {
        opts.validate()?;
        let seq = scan_sequence( &opts.input_dir, &opts.selection, Some( &opts.output_path))?;
        if ARGS.json {
            println!("{}", serde_json::to_string_pretty( &seq)?);
        } else {
            print_sequence( &seq);
        }

    } else {
        let summary = assemble_with( &opts)?;
        if ARGS.json {
            println!("{}", serde_json::to_string_pretty( &summary)?);
        } else {
            print_summary( &summary);
        }
    }

    Ok(())
}

/// explicit --config file, or the default animation.ron if there is one
fn get_config()->Result<AnimationConfig> {
    if let Some(path) = &ARGS.config {
        Ok( load_config::<AnimationConfig>( path).map_err( VisuSatAnimationError::from)? )
    } else {
        match load_config::<AnimationConfig>( DEFAULT_CONFIG) {
            Ok(config) => Ok(config),
            Err(VisuSatBuildError::ResourceNotFoundError(_)) => Ok( AnimationConfig::default()),
            Err(e) => Err( VisuSatAnimationError::from(e).into())
        }
    }
}

/// command line arguments take precedence over config values
fn get_options (config: &AnimationConfig)->Result<AnimationOptions> {
    let mut opts = AnimationOptions::from_config( config, &ARGS.input_dir, &ARGS.output_path)?;

    if let Some(fps) = ARGS.fps { opts.frame_rate = fps }
    if let Some(format) = &ARGS.format { opts.format = AnimationFormat::parse( format)? }
    if let Some(loops) = ARGS.loops { opts.loop_policy = LoopPolicy::from_count( loops) }
    if let Some(colormap) = &ARGS.colormap { opts.colormap = parse_colormap( colormap)? }
    if let Some(font) = &ARGS.font { opts.font = Some( PathBuf::from( font)) }
    if ARGS.caption { opts.caption = true }

    opts.selection = FrameSelection {
        sensor: ARGS.sensor.clone(),
        channel: ARGS.channel.clone(),
        start: ARGS.start,
        end: ARGS.end,
    };

    Ok(opts)
}

fn print_sequence (seq: &Sequence) {
    for (i,f) in seq.frames.iter().enumerate() {
        println!("{:4}  {}  {}  {} ch{}  {}", i, iso_string( &f.acquisition_start), iso_string( &f.acquisition_end),
                 f.sensor_tag, f.channel_id, f.file_name());
    }
    for s in &seq.skipped {
        println!("skipped {}: {}", path_to_lossy_string( &s.path), s.reason);
    }
    println!("{} frames, {} skipped, {} excluded", seq.len(), seq.skipped_count(), seq.excluded_count);
}

fn print_summary (summary: &AnimationSummary) {
    for s in &summary.skipped {
        println!("skipped {}: {}", path_to_lossy_string( &s.path), s.reason);
    }
    println!("wrote {} ({}, {} fps): {} frames, {} skipped, {} excluded",
             path_to_lossy_string( &summary.output_path), summary.format, summary.frame_rate,
             summary.included_count, summary.skipped_count, summary.excluded_count);
}
