// ABOUTME: Transfer options and control header serialization for graphics commands
// ABOUTME: Emits a fixed key order and omits zero-valued fields from the header

use crate::constants::markers;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Options describing one graphics command.
///
/// Every numeric field uses zero as "unset": a zero field is left out of the
/// header entirely. This also means a z-index of exactly zero, or an image id
/// of zero, can never be sent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder,
)]
#[builder(field_defaults(default))]
#[serde(default)]
pub struct TransferOptions {
    /// Source rectangle left edge in pixels (`x`)
    pub src_x: u32,
    /// Source rectangle top edge in pixels (`y`)
    pub src_y: u32,
    /// Source rectangle width in pixels (`w`)
    pub src_width: u32,
    /// Source rectangle height in pixels (`h`)
    pub src_height: u32,
    /// Pixel offset inside the first cell (`X`)
    pub cell_offset_x: u32,
    /// Pixel offset inside the first cell (`Y`)
    pub cell_offset_y: u32,
    /// Display width in terminal columns (`c`)
    pub columns: u32,
    /// Display height in terminal rows (`r`)
    pub rows: u32,
    /// Stacking order, negative draws under text (`z`)
    pub z_index: i32,
    /// Image id (`i`)
    pub image_id: u32,
    /// Image number, the client-side alternative to an id (`I`)
    pub image_number: u32,
    /// Placement id (`p`)
    pub placement_id: u32,
}

impl TransferOptions {
    /// Build a control header: start marker, the caller's flags, every
    /// non-zero option, then `;`.
    ///
    /// The end marker is not included; it follows whatever payload the
    /// caller writes next.
    pub fn to_header<S: AsRef<str>>(&self, flags: &[S]) -> String {
        let fields = [
            ('x', self.src_x),
            ('y', self.src_y),
            ('w', self.src_width),
            ('h', self.src_height),
            ('X', self.cell_offset_x),
            ('Y', self.cell_offset_y),
            ('c', self.columns),
            ('r', self.rows),
            ('i', self.image_id),
            ('I', self.image_number),
            ('p', self.placement_id),
        ];

        let mut parts: Vec<String> = flags.iter().map(|f| f.as_ref().to_string()).collect();
        parts.extend(
            fields
                .iter()
                .filter(|(_, value)| *value != 0)
                .map(|(key, value)| format!("{}={}", key, value)),
        );

        if self.z_index != 0 {
            parts.push(format!("z={}", self.z_index));
        }

        format!("{}{};", markers::START, parts.join(","))
    }

    /// Copy of `self` where every non-zero field of `other` wins.
    pub fn overlay(&self, other: &TransferOptions) -> TransferOptions {
        let pick = |base: u32, top: u32| if top != 0 { top } else { base };

        TransferOptions {
            src_x: pick(self.src_x, other.src_x),
            src_y: pick(self.src_y, other.src_y),
            src_width: pick(self.src_width, other.src_width),
            src_height: pick(self.src_height, other.src_height),
            cell_offset_x: pick(self.cell_offset_x, other.cell_offset_x),
            cell_offset_y: pick(self.cell_offset_y, other.cell_offset_y),
            columns: pick(self.columns, other.columns),
            rows: pick(self.rows, other.rows),
            z_index: if other.z_index != 0 {
                other.z_index
            } else {
                self.z_index
            },
            image_id: pick(self.image_id, other.image_id),
            image_number: pick(self.image_number, other.image_number),
            placement_id: pick(self.placement_id, other.placement_id),
        }
    }
}
