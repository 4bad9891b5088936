// Domain layer: records, request/response shapes and ports. No framework types here.

pub mod model;
pub mod ports;
