// ABOUTME: Command handlers that connect files on disk to the graphics encoder
// ABOUTME: Resolves settings from flags and config, then writes escape sequences to a sink

use crate::cli::PlacementArgs;
use crate::config::Config;
use anyhow::{Context, Result, bail};
use image::{ImageFormat, ImageReader};
use kitty_graphics::{AnimationState, KittyEncoder, TransferOptions};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

/// Settings shared by every command after flags and config are combined
#[derive(Debug, Clone)]
pub struct Settings {
    pub encoder: KittyEncoder,
    pub options: TransferOptions,
    pub loop_count: u32,
}

impl Settings {
    /// Flags win over config values; unset values stay zero (omitted).
    pub fn resolve(config: &Config, placement: &PlacementArgs) -> Self {
        let flags = TransferOptions::builder()
            .image_id(placement.id.unwrap_or(0))
            .columns(placement.cols.unwrap_or(0))
            .rows(placement.rows.unwrap_or(0))
            .z_index(placement.z.unwrap_or(0))
            .placement_id(placement.placement.unwrap_or(0))
            .build();
        let options = config.placement.overlay(&flags);

        Self {
            encoder: KittyEncoder::with_chunk_size(config.chunk_size_or_default()),
            options,
            loop_count: config.loop_count.unwrap_or(1),
        }
    }
}

/// How `show` will send a file, decided from its leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowMode {
    /// Already PNG: stream the file bytes untouched
    Passthrough,
    /// GIF: decode frames and send an animation
    Animation,
    /// Anything else the image crate can read: decode and re-encode as PNG
    Convert,
}

pub fn detect_mode<R: Read + Seek>(reader: &mut R) -> Result<ShowMode> {
    let mut magic = Vec::with_capacity(16);
    reader
        .by_ref()
        .take(16)
        .read_to_end(&mut magic)
        .context("Failed to read image header")?;
    reader.rewind().context("Failed to rewind image file")?;

    Ok(match image::guess_format(&magic) {
        Ok(ImageFormat::Png) => ShowMode::Passthrough,
        Ok(ImageFormat::Gif) => ShowMode::Animation,
        _ => ShowMode::Convert,
    })
}

pub fn show<W: Write + ?Sized>(
    out: &mut W,
    path: &Path,
    settings: &Settings,
    play: bool,
) -> Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mode = detect_mode(&mut reader)?;
    log::debug!("showing {} as {:?}", path.display(), mode);

    match mode {
        ShowMode::Passthrough => settings
            .encoder
            .write_png_reader(out, reader, &settings.options)
            .with_context(|| format!("Failed to send {}", path.display()))?,
        ShowMode::Animation => {
            settings
                .encoder
                .write_gif(out, reader, &settings.options)
                .with_context(|| format!("Failed to send animation {}", path.display()))?;

            if play && settings.options.image_id != 0 {
                settings
                    .encoder
                    .control_animation(
                        out,
                        settings.options.image_id,
                        AnimationState::Running,
                        settings.loop_count,
                    )
                    .context("Failed to start animation")?;
            } else if play {
                log::warn!("animation needs --id to be played; showing first frame only");
            }
        }
        ShowMode::Convert => {
            let image = ImageReader::new(reader)
                .with_guessed_format()
                .context("Failed to read image file")?
                .decode()
                .with_context(|| format!("Failed to decode {}", path.display()))?;
            settings
                .encoder
                .write_image(out, &image, &settings.options)
                .with_context(|| format!("Failed to send {}", path.display()))?;
        }
    }

    out.flush().context("Failed to flush output")?;
    Ok(())
}

pub fn local<W: Write + ?Sized>(out: &mut W, path: &Path, settings: &Settings) -> Result<()> {
    let absolute = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;

    if !absolute.is_file() {
        bail!("{} is not a file", absolute.display());
    }

    settings
        .encoder
        .write_png_local(out, &absolute, &settings.options)
        .context("Failed to send file reference")?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}

/// Without an id, delete everything and reset the screen; with one, delete
/// only that image's placements.
pub fn clean<W: Write + ?Sized>(out: &mut W, image_id: Option<u32>) -> Result<()> {
    let encoder = KittyEncoder::new();

    match image_id {
        Some(id) => encoder
            .delete_image(out, id)
            .with_context(|| format!("Failed to delete image {}", id))?,
        None => encoder
            .clean(out, &TransferOptions::default())
            .context("Failed to reset terminal")?,
    }

    out.flush().context("Failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_mode() {
        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
        assert_eq!(detect_mode(&mut Cursor::new(png)).unwrap(), ShowMode::Passthrough);

        let gif = b"GIF89a\x01\0\x01\0\0\0\0".to_vec();
        assert_eq!(detect_mode(&mut Cursor::new(gif)).unwrap(), ShowMode::Animation);

        let other = b"BM\0\0\0\0".to_vec();
        assert_eq!(detect_mode(&mut Cursor::new(other)).unwrap(), ShowMode::Convert);
    }

    #[test]
    fn test_detect_mode_rewinds() {
        let mut cursor = Cursor::new(b"GIF89a".to_vec());
        detect_mode(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_settings_prefer_flags_over_config() {
        let config = Config {
            placement: TransferOptions::builder().image_id(1).columns(20).build(),
            chunk_size: Some(1024),
            ..Default::default()
        };
        let placement = PlacementArgs {
            id: Some(9),
            z: Some(-1),
            ..Default::default()
        };

        let settings = Settings::resolve(&config, &placement);
        assert_eq!(settings.options.image_id, 9);
        assert_eq!(settings.options.columns, 20);
        assert_eq!(settings.options.z_index, -1);
        assert_eq!(settings.encoder.chunk_size(), 1024);
        assert_eq!(settings.loop_count, 1);
    }
}
