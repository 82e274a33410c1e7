pub mod json;
mod markdown;
mod summary;

pub use json::{create_output, print_json, write_json};
pub use markdown::{print_markdown, write_markdown};
pub use summary::print_summary;
