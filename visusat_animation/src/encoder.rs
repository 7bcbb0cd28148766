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

use std::{fs::{self, File, Permissions}, io::{BufWriter, Write}, path::Path, process::{Command, Stdio}, time::Duration};
use image::{codecs::gif::{GifEncoder, Repeat}, Delay, RgbaImage};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use visusat_image::crop_to_even;

use crate::errors::{encoding_error, Result};

/// how often an image loop repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoopPolicy {
    #[default]
    Infinite,
    Finite(u16),
}

impl LoopPolicy {
    /// GIF convention: 0 means forever
    pub fn from_count (n: u16)->Self {
        if n == 0 { LoopPolicy::Infinite } else { LoopPolicy::Finite(n) }
    }
}

/// rendered frames in presentation order
pub type FrameIter<'a> = dyn Iterator<Item=Result<RgbaImage>> + 'a;

/// something that turns an ordered stream of equally sized RGBA frames into an animation file
pub trait AnimationEncoder {
    /// encode all frames into the file at `out`, returning the number of frames written
    fn encode (&self, frames: &mut FrameIter<'_>, out: &Path)->Result<usize>;
}

/// per frame display duration for a given rate
pub fn frame_duration (frame_rate: f64)->Duration {
    Duration::from_secs_f64( 1.0 / frame_rate)
}

/* #region gif ***********************************************************************************/

/// GIF speed setting for the NeuQuant quantizer (1: best quality, 30: fastest)
const GIF_SPEED: i32 = 10;

pub struct GifAnimationEncoder {
    pub frame_rate: f64,
    pub loop_policy: LoopPolicy,
}

impl AnimationEncoder for GifAnimationEncoder {
    fn encode (&self, frames: &mut FrameIter<'_>, out: &Path)->Result<usize> {
        let delay = Delay::from_saturating_duration( frame_duration( self.frame_rate));
        let repeat = match self.loop_policy {
            LoopPolicy::Infinite => Repeat::Infinite,
            LoopPolicy::Finite(n) => Repeat::Finite(n),
        };

        let mut writer = BufWriter::new( File::create( out)?);
        let mut n = 0;
        {
            let mut encoder = GifEncoder::new_with_speed( &mut writer, GIF_SPEED);
            encoder.set_repeat( repeat).map_err( encoding_error)?;

            for img in frames {
                let frame = image::Frame::from_parts( img?, 0, 0, delay);
                encoder.encode_frame( frame).map_err( encoding_error)?;
                n += 1;
            }
        } // dropping the encoder writes the GIF trailer
        writer.flush()?;

        info!("encoded {n} GIF frames to {out:?}");
        Ok(n)
    }
}

/* #endregion gif */

/* #region ffmpeg ********************************************************************************/

/// MP4 (H.264) output through an external ffmpeg process that reads raw RGBA frames from stdin
pub struct FfmpegVideoEncoder {
    pub ffmpeg: String,
    pub video_codec: String,
    pub frame_rate: f64,
}

impl FfmpegVideoEncoder {
    pub fn command (&self, width: u32, height: u32, out: &Path)->Command {
        let mut cmd = Command::new( &self.ffmpeg);
        cmd
            .arg("-hide_banner")
            .arg("-loglevel").arg("error")
            .arg("-y")
            .arg("-f").arg("rawvideo")
            .arg("-pix_fmt").arg("rgba")
            .arg("-s").arg( format!("{width}x{height}"))
            .arg("-r").arg( self.frame_rate.to_string())
            .arg("-i").arg("-")
            .arg("-an")
            .arg("-c:v").arg( &self.video_codec)
            .arg("-pix_fmt").arg("yuv420p")
            .arg("-f").arg("mp4")
            .arg( out.as_os_str());
        cmd
    }
}

impl AnimationEncoder for FfmpegVideoEncoder {
    fn encode (&self, frames: &mut FrameIter<'_>, out: &Path)->Result<usize> {
        let first = match frames.next() {
            Some(img) => crop_to_even( img?),
            None => return Err( encoding_error("no frames to encode"))
        };
        let (w,h) = first.dimensions();
        if w < 2 || h < 2 {
            return Err( encoding_error( format!("frame size {w}x{h} too small for video")))
        }

        let mut cmd = self.command( w, h, out);
        cmd.stdin( Stdio::piped()).stdout( Stdio::null()).stderr( Stdio::piped());
        debug!("executing {cmd:?}");

        let mut child = cmd.spawn().map_err( |e| encoding_error( format!("failed to run {}: {e}", self.ffmpeg)))?;
        let mut n = 0;
        let write_result = match child.stdin.take() {
            Some(stdin) => write_raw_frames( BufWriter::new( stdin), first, frames, &mut n),
            None => Err( encoding_error("no stdin for ffmpeg process"))
        }; // stdin is closed here so that ffmpeg sees EOF

        let output = child.wait_with_output().map_err( encoding_error)?;

        // an early exit shows up as a broken pipe on our side, the cause is in ffmpeg's stderr
        if !output.status.success() {
            let stderr = String::from_utf8_lossy( &output.stderr);
            let mut msg = format!("{} exited with {}: {}", self.ffmpeg, output.status, stderr.trim());
            if let Err(e) = write_result {
                msg.push_str( &format!(" ({e})"));
            }
            return Err( encoding_error( msg))
        }
        write_result?;

        info!("encoded {n} video frames to {out:?}");
        Ok(n)
    }
}

/// stream raw RGBA frames of the same (even) size as `first` into `out`
fn write_raw_frames<W: Write> (mut out: W, first: RgbaImage, frames: &mut FrameIter<'_>, n: &mut usize)->Result<()> {
    let dims = first.dimensions();
    out.write_all( first.as_raw()).map_err( encoding_error)?;
    *n += 1;

    for img in frames {
        let img = crop_to_even( img?);
        if img.dimensions() != dims {
            return Err( encoding_error( format!("frame {n} has size {:?}, expected {dims:?}", img.dimensions())))
        }
        out.write_all( img.as_raw()).map_err( encoding_error)?;
        *n += 1;
    }

    out.flush().map_err( encoding_error)
}

/* #endregion ffmpeg */

/// run `encoder` into a temporary file next to `output_path` and move it into place once complete.
/// On failure the temporary file is removed and `output_path` is left untouched.
/// The result gets the permissions of a replaced `output_path`, or those of a newly created file
pub fn encode_atomically (encoder: &dyn AnimationEncoder, frames: &mut FrameIter<'_>, output_path: &Path)->Result<usize> {
    let dir = visusat_common::fs::parent_dir( output_path);
    let mut builder = tempfile::Builder::new();
    builder.prefix(".visusat-").suffix(".part");
    if let Some(perms) = new_file_permissions() {
        builder.permissions( perms);
    }
    let tmp: NamedTempFile = builder.tempfile_in( &dir)?;

    let n = encoder.encode( frames, tmp.path())?;

    if let Ok(meta) = fs::metadata( output_path) {
        fs::set_permissions( tmp.path(), meta.permissions())?;
    }
    tmp.persist( output_path).map_err( |e| e.error)?;
    Ok(n)
}

/// rw for everybody minus the process umask, as for `File::create`
#[cfg(unix)]
fn new_file_permissions ()->Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some( Permissions::from_mode( 0o666))
}

#[cfg(not(unix))]
fn new_file_permissions ()->Option<Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use crate::errors::VisuSatAnimationError;

    fn raw_frames (sizes: &[(u32,u32)])->Vec<Result<RgbaImage>> {
        sizes.iter().map( |(w,h)| Ok( RgbaImage::from_pixel( *w, *h, Rgba([1,2,3,255])))).collect()
    }

    #[test]
    fn test_raw_frames_cropped_to_even () {
        let first = crop_to_even( RgbaImage::from_pixel( 5, 3, Rgba([9,9,9,255])));
        let mut rest = raw_frames( &[(5,3), (4,2)]).into_iter();
        let mut out: Vec<u8> = Vec::new();
        let mut n = 0;

        write_raw_frames( &mut out, first, &mut rest, &mut n).unwrap();
        assert_eq!( n, 3);
        assert_eq!( out.len(), 3 * 4*2*4);
        assert_eq!( &out[0..4], &[9,9,9,255]);
        assert_eq!( &out[32..36], &[1,2,3,255]);
    }

    #[test]
    fn test_raw_frame_size_mismatch () {
        let first = crop_to_even( RgbaImage::from_pixel( 5, 3, Rgba([9,9,9,255])));
        let mut rest = raw_frames( &[(7,3)]).into_iter();
        let mut out: Vec<u8> = Vec::new();
        let mut n = 0;

        let res = write_raw_frames( &mut out, first, &mut rest, &mut n);
        assert!( matches!( res, Err(VisuSatAnimationError::Encoding(_))));
        assert_eq!( n, 1);
        assert_eq!( out.len(), 4*2*4);
    }
}
