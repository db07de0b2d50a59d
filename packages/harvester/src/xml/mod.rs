//! XML navigation helpers shared by the summary and document parsers.

mod utils;

pub use utils::{find_child, find_children, find_descendant, get_tag_name, get_text};
