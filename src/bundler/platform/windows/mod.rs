//! Windows packaging: NSIS installers.

pub mod nsis;
