//! macOS packaging: bundle metadata and DMG disk images.

pub mod dmg;
pub mod info_plist;
