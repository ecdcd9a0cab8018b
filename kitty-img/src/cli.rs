// ABOUTME: CLI argument definitions for the kitty-img application
// ABOUTME: Defines the command-line interface structure using clap derive macros

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kitty-img")]
#[command(about = "Show images inline using the kitty graphics protocol", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Send graphics even if the terminal does not look kitty-capable
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream an image or GIF animation to the terminal
    Show {
        /// Image file (PNG is sent as-is, GIF is animated, other formats are converted)
        file: PathBuf,

        #[command(flatten)]
        placement: PlacementArgs,

        /// Do not start playback after sending an animation
        #[arg(long)]
        no_play: bool,

        /// Loop count for animations (1 = forever)
        #[arg(long)]
        loops: Option<u32>,
    },
    /// Ask the terminal to read a PNG file directly from disk
    Local {
        /// PNG file readable by the terminal process
        file: PathBuf,

        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// Delete all images, clear the screen and home the cursor
    Clean {
        /// Delete only this image's placements and leave the screen as is
        #[arg(long)]
        id: Option<u32>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct PlacementArgs {
    /// Image id to assign (required for animation frames to find their image)
    #[arg(long)]
    pub id: Option<u32>,

    /// Display width in terminal columns
    #[arg(long, short)]
    pub cols: Option<u32>,

    /// Display height in terminal rows
    #[arg(long, short)]
    pub rows: Option<u32>,

    /// Stacking order relative to text (negative draws below text)
    #[arg(long, short, allow_negative_numbers = true)]
    pub z: Option<i32>,

    /// Placement id
    #[arg(long)]
    pub placement: Option<u32>,
}
