pub mod decode;
pub mod encode;
pub mod file;
pub mod folder;
pub mod info;

pub use decode::*;
pub use encode::*;
pub use file::*;
pub use folder::*;
pub use info::*;
