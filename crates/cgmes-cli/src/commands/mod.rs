pub mod archive;
pub mod completions;
pub mod metadata;
pub mod scan;
pub mod util;
