//! Document chopping: recursive, markdown-header and fixed-window splitters
//! with a JSON-Lines pipeline on top.

pub mod pipeline;
pub mod text;
pub mod util;
