mod load;
mod probe;
mod route;
mod runner;
mod stats;
mod stress;

pub use runner::{Engine, RunState, parse_base_url};
pub use stats::{Stats, format_rate};
