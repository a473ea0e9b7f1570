//! A switch socket and its keycap as one assembly.

use tracing::debug;

use crate::assembly::{AnchorRef, Assembly, PartCollection};
use crate::config::{KeebConfig, KeyAlignment, SwitchType};
use crate::keycap::build_keycap;
use crate::socket::cherry_mx_socket;
use crate::Result;

/// Assemble a key `units` wide from the socket, keycap and key sections.
///
/// The children are named `socket` and `keycap`. The key's anchors are the
/// top corners of the keycap for [`KeyAlignment::Face`] or of the socket
/// for [`KeyAlignment::Socket`], read from the child each time so they
/// follow any later transform of the key.
pub fn build_key(config: &KeebConfig, units: u32) -> Result<Assembly> {
    let socket = match config.key.switch_type {
        SwitchType::CherryMx => cherry_mx_socket(&config.socket, units)?,
    };
    let keycap = build_keycap(&config.keycap, units)?;

    let mut parts = PartCollection::new();
    parts.add_named("socket", socket)?;
    parts.add_named("keycap", keycap)?;

    let aligned_to = match config.key.alignment {
        KeyAlignment::Face => "keycap",
        KeyAlignment::Socket => "socket",
    };
    debug!(units, alignment = aligned_to, "key built");
    Assembly::with_derived_anchors("key", parts, &[AnchorRef::new(&[aligned_to], &["top"])])
}
