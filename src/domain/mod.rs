// Domain layer: form input, typed configuration records and the storage port.
// Nothing here touches the filesystem directly.

pub mod enums;
pub mod form;
pub mod model;
pub mod ports;
pub mod session;
pub mod steps;
