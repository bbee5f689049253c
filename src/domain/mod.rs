// Domain layer: core models and ports (interfaces) shared by the server and client flows.

pub mod model;
pub mod ports;
