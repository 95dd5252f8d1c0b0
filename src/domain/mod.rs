// Domain layer: models, configuration values and ports. No I/O here.

pub mod model;
pub mod ports;
pub mod settings;
