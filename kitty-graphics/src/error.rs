// ABOUTME: Error types for the kitty graphics encoder with user-facing messages
// ABOUTME: Aggregates failures from multi-stage streamed transfers into one value

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphicsError>;

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("Failed to decode animation")]
    DecodeFailure,

    #[error("Frame {index} has zero width or height")]
    ZeroExtentFrame { index: usize },

    #[error("Failed to write to output: {0}")]
    SinkWrite(#[from] io::Error),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("{}", join_messages(.0))]
    Multiple(Vec<GraphicsError>),
}

impl GraphicsError {
    /// Fold every failure from a sequence of stages into a single result.
    ///
    /// No failures yields `Ok(())`, one failure is returned as-is, and two or
    /// more become [`GraphicsError::Multiple`] in the order they occurred.
    pub fn collect<I>(results: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<()>>,
    {
        let mut errors: Vec<GraphicsError> =
            results.into_iter().filter_map(|r| r.err()).collect();

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(GraphicsError::Multiple(errors)),
        }
    }

    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            GraphicsError::DecodeFailure => {
                Some("Check that the input is a complete, well-formed GIF file")
            }
            GraphicsError::ZeroExtentFrame { .. } => {
                Some("The animation contains an empty frame; re-export it with an image editor")
            }
            GraphicsError::SinkWrite(_) | GraphicsError::Multiple(_) => Some(
                "The terminal may hold a partial image; delete it and retry with a new image id",
            ),
            GraphicsError::Encode(_) => None,
        }
    }
}

fn join_messages(errors: &[GraphicsError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
