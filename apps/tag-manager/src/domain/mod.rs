// Domain layer module exports
// Agents, zones and per-agent tag state. Nothing here knows about the
// transport, the tick driver or the HTTP adapter.

pub mod agent;
pub mod tag;
pub mod zone;
