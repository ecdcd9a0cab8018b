// ABOUTME: Animated GIF transfer built from composited frames and frame-update commands
// ABOUTME: Computes the shared canvas, sends frame 0 as an image, then each later frame

use crate::constants::flags;
use crate::encoder::{KittyEncoder, write_header};
use crate::error::{GraphicsError, Result};
use crate::header::TransferOptions;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Frame, ImageFormat, RgbaImage, imageops};
use std::io::{BufRead, Cursor, Seek, Write};

/// Playback state for an animation control command (`s` key)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    Stopped = 1,
    /// Play, then wait at the last frame for more frames to arrive
    Loading = 2,
    Running = 3,
}

/// Decode every frame of a GIF, in display order.
///
/// Any decoder failure is reported as [`GraphicsError::DecodeFailure`];
/// the underlying cause is only logged.
pub fn decode_gif_frames<R: BufRead + Seek>(reader: R) -> Result<Vec<Frame>> {
    let decoder = GifDecoder::new(reader).map_err(|e| {
        log::debug!("GIF header decode error: {}", e);
        GraphicsError::DecodeFailure
    })?;

    let frames = decoder.into_frames().collect_frames().map_err(|e| {
        log::debug!("GIF frame decode error: {}", e);
        GraphicsError::DecodeFailure
    })?;

    if frames.is_empty() {
        return Err(GraphicsError::DecodeFailure);
    }

    Ok(frames)
}

/// Size of the canvas that holds every frame at its offset.
///
/// GIF offsets are unsigned logical-screen coordinates, so the union of
/// all frame rectangles always starts at the origin.
pub fn canvas_size(frames: &[Frame]) -> (u32, u32) {
    frames.iter().fold((0, 0), |(width, height), frame| {
        let (w, h) = frame.buffer().dimensions();
        (
            width.max(frame.left().saturating_add(w)),
            height.max(frame.top().saturating_add(h)),
        )
    })
}

fn encode_canvas(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(GraphicsError::Encode)?;
    Ok(buffer)
}

/// Frame delay in milliseconds, used as the frame gap hint.
fn delay_ms(frame: &Frame) -> u32 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    if denom == 0 {
        0
    } else {
        numer / denom
    }
}

impl KittyEncoder {
    /// Decode a GIF and send it as an animation.
    pub fn write_gif<W: Write + ?Sized, R: BufRead + Seek>(
        &self,
        out: &mut W,
        reader: R,
        opts: &TransferOptions,
    ) -> Result<()> {
        let frames = decode_gif_frames(reader)?;
        self.write_frames(out, &frames, opts)
    }

    /// Send decoded frames as one animated image.
    ///
    /// Frame 0 goes out as a full transmit-and-display command sized to the
    /// canvas. Every later frame is painted over the accumulated canvas and
    /// sent as a frame-update command for the same image, with its delay as
    /// the gap hint. A frame is only started once the previous one has been
    /// closed. An empty frame after the first aborts the whole sequence
    /// before anything for it is written.
    pub fn write_frames<W: Write + ?Sized>(
        &self,
        out: &mut W,
        frames: &[Frame],
        opts: &TransferOptions,
    ) -> Result<()> {
        let Some((first, rest)) = frames.split_first() else {
            return Err(GraphicsError::DecodeFailure);
        };

        let (width, height) = canvas_size(frames);
        let mut base = *opts;
        base.src_width = width;
        base.src_height = height;

        if !rest.is_empty() && opts.image_id == 0 && opts.image_number == 0 {
            log::warn!("animation sent without an image id; later frames have no target");
        }

        let mut canvas = RgbaImage::new(width, height);
        imageops::replace(
            &mut canvas,
            first.buffer(),
            i64::from(first.left()),
            i64::from(first.top()),
        );
        let png = encode_canvas(&canvas)?;
        self.write_png_reader(out, png.as_slice(), &base)?;
        log::debug!("sent base frame {}x{}", width, height);

        for (offset, frame) in rest.iter().enumerate() {
            let index = offset + 1;
            let (w, h) = frame.buffer().dimensions();
            if w == 0 || h == 0 {
                return Err(GraphicsError::ZeroExtentFrame { index });
            }

            imageops::overlay(
                &mut canvas,
                frame.buffer(),
                i64::from(frame.left()),
                i64::from(frame.top()),
            );
            self.write_frame(out, &canvas, opts, delay_ms(frame))?;
            log::trace!("sent frame {}", index);
        }

        log::debug!("sent {} animation frames", frames.len());
        Ok(())
    }

    /// Emit one frame-update command carrying a complete PNG of `canvas`.
    fn write_frame<W: Write + ?Sized>(
        &self,
        out: &mut W,
        canvas: &RgbaImage,
        opts: &TransferOptions,
        gap_ms: u32,
    ) -> Result<()> {
        let png = encode_canvas(canvas)?;

        let frame_opts = TransferOptions {
            image_id: opts.image_id,
            image_number: opts.image_number,
            z_index: i32::try_from(gap_ms).unwrap_or(i32::MAX),
            ..TransferOptions::default()
        };
        let header = frame_opts.to_header(&[
            flags::ACTION_FRAME.to_string(),
            flags::FORMAT_PNG.to_string(),
            flags::MEDIUM_DIRECT.to_string(),
            flags::MORE_DATA.to_string(),
            format!("s={}", canvas.width()),
            format!("v={}", canvas.height()),
        ]);

        write_header(out, &header)?;
        self.stream_chunked(out, png.as_slice())
    }

    /// Start, stop or loop an animation that is already on screen.
    ///
    /// `loops` follows the protocol: 0 leaves the loop count alone, 1 loops
    /// forever, n plays n - 1 times. Nothing is read back from the terminal.
    pub fn control_animation<W: Write + ?Sized>(
        &self,
        out: &mut W,
        image_id: u32,
        state: AnimationState,
        loops: u32,
    ) -> Result<()> {
        let mut parts = vec![
            flags::ACTION_ANIMATE.to_string(),
            format!("s={}", state as u8),
        ];
        if loops != 0 {
            parts.push(format!("v={}", loops));
        }

        let opts = TransferOptions::builder().image_id(image_id).build();
        write_header(out, &opts.to_header(&parts))?;
        log::debug!("animation {} set to {:?}", image_id, state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Delay, Rgba};

    fn frame(width: u32, height: u32, left: u32, top: u32, delay: u32) -> Frame {
        Frame::from_parts(
            RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])),
            left,
            top,
            Delay::from_numer_denom_ms(delay, 1),
        )
    }

    #[test]
    fn test_canvas_is_union_of_frame_rectangles() {
        let frames = vec![frame(10, 10, 0, 0, 0), frame(20, 20, 5, 5, 0)];
        assert_eq!(canvas_size(&frames), (25, 25));
    }

    #[test]
    fn test_canvas_includes_origin_for_offset_frames() {
        let frames = vec![frame(4, 6, 10, 2, 0)];
        assert_eq!(canvas_size(&frames), (14, 8));
    }

    #[test]
    fn test_canvas_tracks_axes_independently() {
        let frames = vec![frame(30, 2, 0, 0, 0), frame(2, 40, 1, 1, 0)];
        assert_eq!(canvas_size(&frames), (30, 41));
    }

    #[test]
    fn test_delay_in_milliseconds() {
        assert_eq!(delay_ms(&frame(1, 1, 0, 0, 70)), 70);
        assert_eq!(delay_ms(&frame(1, 1, 0, 0, 0)), 0);
    }

    #[test]
    fn test_control_animation_header() {
        let mut out = Vec::new();
        KittyEncoder::new()
            .control_animation(&mut out, 9, AnimationState::Running, 1)
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\x1b_Ga=a,s=3,v=1,i=9;\x1b\\"
        );
    }

    #[test]
    fn test_control_animation_without_loop_count() {
        let mut out = Vec::new();
        KittyEncoder::new()
            .control_animation(&mut out, 2, AnimationState::Stopped, 0)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\x1b_Ga=a,s=1,i=2;\x1b\\");
    }

    #[test]
    fn test_empty_frame_list_is_decode_failure() {
        let mut out = Vec::new();
        let result = KittyEncoder::new().write_frames(&mut out, &[], &TransferOptions::default());
        assert!(matches!(result, Err(GraphicsError::DecodeFailure)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_frame_header_carries_size_id_and_gap() {
        let frames = vec![frame(3, 2, 0, 0, 0), frame(3, 2, 0, 0, 50)];
        let opts = TransferOptions::builder().image_id(4).columns(10).build();
        let mut out = Vec::new();

        KittyEncoder::new().write_frames(&mut out, &frames, &opts).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\x1b_Ga=T,f=100,t=d,m=1,w=3,h=2,c=10,i=4;\x1b\\"));
        assert!(text.contains("\x1b_Ga=f,f=100,t=d,m=1,s=3,v=2,i=4,z=50;\x1b\\"));
        assert_eq!(text.matches("\x1b_Gm=0;\x1b\\").count(), 2);
    }
}
