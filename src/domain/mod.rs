// Domain layer: plain records and provider ports. No HTTP or config types here.

pub mod model;
pub mod ports;
