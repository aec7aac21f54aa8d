// Domain layer: sample items, diff reports and the port the comparator fetches through.

pub mod model;
pub mod ports;
