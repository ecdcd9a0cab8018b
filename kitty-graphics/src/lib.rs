// ABOUTME: Kitty graphics protocol encoder for still images and GIF animations
// ABOUTME: Builds control headers and streams base64 payloads in framed chunks

//! Writes images to a terminal using the kitty graphics protocol.
//!
//! ```text
//! PNG bytes ─▶ base64 ─▶ BufWriter(chunk) ─▶ ChunkWriter ─▶ sink
//!                                              │
//!                              ESC_Gm=1;<piece>ESC\ … ESC_Gm=0;ESC\
//! ```
//!
//! All operations are synchronous and write straight to the sink you pass
//! in. Only one transfer may be in flight per sink.

pub mod animation;
pub mod chunk;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod header;

pub use animation::{AnimationState, canvas_size, decode_gif_frames};
pub use chunk::ChunkWriter;
pub use encoder::KittyEncoder;
pub use error::{GraphicsError, Result};
pub use header::TransferOptions;
