// ABOUTME: Image transfer orchestration for the kitty graphics protocol
// ABOUTME: Sends local file references, streamed PNG payloads, and cleanup sequences

use crate::chunk::{ChunkWriter, aligned_chunk_size};
use crate::constants::{chunking::DEFAULT_CHUNK_SIZE, flags, markers, terminal};
use crate::error::{GraphicsError, Result};
use crate::header::TransferOptions;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use base64::write::EncoderWriter;
use image::{DynamicImage, ImageFormat};
use std::io::{self, BufWriter, Cursor, Read, Write};
use std::path::Path;

/// Writes graphics commands to any byte sink.
///
/// The encoder holds no state between calls; it only remembers how large
/// each chunk of a streamed payload may be. Transfers must not interleave
/// on the same sink.
#[derive(Debug, Clone, Copy)]
pub struct KittyEncoder {
    chunk_size: usize,
}

impl Default for KittyEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KittyEncoder {
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size. Zero keeps the default; other sizes are
    /// rounded down to a multiple of 4.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: aligned_chunk_size(chunk_size),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Ask the terminal to load a PNG file itself.
    ///
    /// Only the path travels over the wire, so it must be absolute and
    /// readable by the terminal process. The path is not checked here.
    pub fn write_png_local<W: Write + ?Sized>(
        &self,
        out: &mut W,
        png_path: &Path,
        opts: &TransferOptions,
    ) -> Result<()> {
        let header = opts.to_header(&[
            flags::ACTION_TRANSMIT_DISPLAY,
            flags::FORMAT_PNG,
            flags::MEDIUM_FILE,
        ]);
        let payload = STANDARD.encode(png_path.as_os_str().as_encoded_bytes());

        out.write_all(header.as_bytes())?;
        out.write_all(payload.as_bytes())?;
        out.write_all(markers::END.as_bytes())?;

        log::debug!("sent local file reference {}", png_path.display());
        Ok(())
    }

    /// Encode an in-memory image as PNG and stream it to the terminal.
    pub fn write_image<W: Write + ?Sized>(
        &self,
        out: &mut W,
        image: &DynamicImage,
        opts: &TransferOptions,
    ) -> Result<()> {
        let png = encode_png(image)?;
        self.write_png_reader(out, png.as_slice(), opts)
    }

    /// Stream PNG bytes from `source` as a transmit-and-display command.
    ///
    /// Failures while copying and while closing each pipeline stage are
    /// collected together, so the returned error names every cause.
    pub fn write_png_reader<W: Write + ?Sized, R: Read>(
        &self,
        out: &mut W,
        source: R,
        opts: &TransferOptions,
    ) -> Result<()> {
        let header = opts.to_header(&[
            flags::ACTION_TRANSMIT_DISPLAY,
            flags::FORMAT_PNG,
            flags::MEDIUM_DIRECT,
            flags::MORE_DATA,
        ]);
        write_header(out, &header)?;
        self.stream_chunked(out, source)
    }

    /// Remove every placement, clear the screen and home the cursor.
    ///
    /// Stops at the first failed write; a partial reset is possible.
    pub fn clean<W: Write + ?Sized>(&self, out: &mut W, opts: &TransferOptions) -> Result<()> {
        let header = opts.to_header(&[flags::ACTION_DELETE, flags::DELETE_ALL]);
        write_header(out, &header)?;
        out.write_all(terminal::CLEAR_SCREEN.as_bytes())?;
        out.write_all(terminal::CURSOR_HOME.as_bytes())?;
        Ok(())
    }

    /// Remove the placements of one image, leaving the rest of the screen alone.
    pub fn delete_image<W: Write + ?Sized>(&self, out: &mut W, image_id: u32) -> Result<()> {
        let opts = TransferOptions::builder().image_id(image_id).build();
        write_header(out, &opts.to_header(&[flags::ACTION_DELETE, flags::DELETE_BY_ID]))?;
        log::debug!("deleted placements of image {}", image_id);
        Ok(())
    }

    /// Copy `source` through base64 and the chunker, then close both.
    ///
    /// Every stage is torn down even when an earlier one failed.
    pub(crate) fn stream_chunked<W: Write + ?Sized, R: Read>(
        &self,
        out: &mut W,
        mut source: R,
    ) -> Result<()> {
        let mut chunker = ChunkWriter::with_chunk_size(out, self.chunk_size);

        let (copied, encoded, flushed) = {
            let mut buffered = BufWriter::with_capacity(self.chunk_size, &mut chunker);
            let (copied, encoded) = {
                let mut encoder = EncoderWriter::new(&mut buffered, &STANDARD);
                let copied = io::copy(&mut source, &mut encoder);
                let encoded = encoder.finish().map(|_| ());
                (copied, encoded)
            };
            let flushed = buffered.flush();
            (copied, encoded, flushed)
        };

        let chunks = chunker.chunks_written();
        let closed = chunker.close().map(|_| ());

        if let Ok(bytes) = &copied {
            log::debug!("streamed {} payload bytes in {} chunks", bytes, chunks);
        }

        GraphicsError::collect([
            copied.map(|_| ()).map_err(GraphicsError::from),
            encoded.map_err(GraphicsError::from),
            flushed.map_err(GraphicsError::from),
            closed.map_err(GraphicsError::from),
        ])
    }
}

/// Write a header immediately followed by the end marker.
pub(crate) fn write_header<W: Write + ?Sized>(out: &mut W, header: &str) -> Result<()> {
    out.write_all(header.as_bytes())?;
    out.write_all(markers::END.as_bytes())?;
    log::trace!("wrote header {:?}", header);
    Ok(())
}

pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(GraphicsError::Encode)?;
    Ok(buffer)
}
