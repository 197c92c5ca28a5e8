// Domain layer: stored models, read-side representations and the ports the
// import pipeline talks to.

pub mod channel;
pub mod model;
pub mod ports;
