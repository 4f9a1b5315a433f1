// Domain layer: wire schemas, value types and ports. No HTTP here.

pub mod analytics;
pub mod model;
pub mod ports;
pub mod social;
