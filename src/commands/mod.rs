pub mod info;
pub mod preview;
pub mod split;
