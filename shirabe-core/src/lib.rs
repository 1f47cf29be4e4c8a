pub mod abbrev;
pub mod cache;
pub mod consts;
pub mod entry;
mod error;
pub mod forms;
pub mod image;
mod info;
pub mod reader;
pub mod sections;

pub use abbrev::*;
pub use cache::*;
pub use consts::*;
pub use entry::*;
pub use error::*;
pub use forms::*;
pub use image::*;
pub use info::*;
pub use sections::*;
