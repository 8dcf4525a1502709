//! Library components of the `ontomap` command line tool.

pub mod input;
pub mod logging;
pub mod reference;
pub mod summary;
