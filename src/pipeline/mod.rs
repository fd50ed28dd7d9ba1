pub mod checksum;
pub mod cipher;
pub mod compress;
pub mod segment;

pub use checksum::*;
pub use cipher::*;
pub use compress::*;
pub use segment::*;
