// Adapters layer: concrete implementations of the domain ports.

pub mod replay;

pub use replay::{parse_landmarks_json, ReplayDetector};
