// ABOUTME: Centralized constants for the kitty graphics protocol encoder
// ABOUTME: Contains escape markers, control keys, chunk sizing, and terminal sequences

/// Escape sequences that frame every graphics command
pub mod markers {
    /// Start of a graphics command (APC `G`)
    pub const START: &str = "\x1b_G";

    /// End of a graphics command (string terminator)
    pub const END: &str = "\x1b\\";
}

/// Ready-made `key=value` flags used in command headers
pub mod flags {
    /// Transmit and display in one step
    pub const ACTION_TRANSMIT_DISPLAY: &str = "a=T";

    /// Transmit one frame of an animation
    pub const ACTION_FRAME: &str = "a=f";

    /// Delete images or placements
    pub const ACTION_DELETE: &str = "a=d";

    /// Control a running animation
    pub const ACTION_ANIMATE: &str = "a=a";

    /// Payload is PNG data
    pub const FORMAT_PNG: &str = "f=100";

    /// Payload is a path to a file the terminal can read
    pub const MEDIUM_FILE: &str = "t=f";

    /// Payload is sent inline
    pub const MEDIUM_DIRECT: &str = "t=d";

    /// More chunks follow
    pub const MORE_DATA: &str = "m=1";

    /// Last chunk, no payload follows
    pub const NO_MORE_DATA: &str = "m=0";

    /// Delete every placement on screen
    pub const DELETE_ALL: &str = "d=a";

    /// Delete the placements of the image named by `i`
    pub const DELETE_BY_ID: &str = "d=i";
}

/// Chunked transfer sizing
pub mod chunking {
    /// Encoded payload bytes per envelope
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;
}

/// Plain terminal sequences outside the graphics protocol
pub mod terminal {
    /// Clear the entire screen
    pub const CLEAR_SCREEN: &str = "\x1b[2J";

    /// Move the cursor to the top-left cell
    pub const CURSOR_HOME: &str = "\x1b[H";
}
