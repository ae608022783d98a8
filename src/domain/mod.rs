// Domain layer: value types and the detector port. No I/O here.

pub mod model;
pub mod ports;
