// Domain layer: row/report models and ports (interfaces) the pipelines run against.

pub mod model;
pub mod ports;
