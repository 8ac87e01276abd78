//! Snapshot providers

#[cfg(windows)]
pub mod live;
pub mod scripted;

#[cfg(windows)]
pub use live::LiveProvider;
pub use scripted::ScriptedProvider;
