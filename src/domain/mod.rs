// Domain layer: Telegram entities, scan results and the ports the core depends on.

pub mod model;
pub mod ports;
