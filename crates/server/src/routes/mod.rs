pub mod health;
pub mod libraries;
pub mod playback_ws;
