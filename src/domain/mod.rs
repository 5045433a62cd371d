// Domain layer: record model and the fetcher port. No HTTP or HTML dependencies here.

pub mod model;
pub mod ports;
