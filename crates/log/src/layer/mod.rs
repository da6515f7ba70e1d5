//! `tracing-subscriber` layers

mod bridge;

pub use bridge::BridgeLayer;
