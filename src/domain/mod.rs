// Domain layer: product model, ports (interfaces) and input parsing. No I/O here.

pub mod ids;
pub mod model;
pub mod ports;
