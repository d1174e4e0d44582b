//! Rendering: styled cells, the clipped-write character buffer, and the
//! crossterm output driver.

pub mod buffer;
pub mod cell;
pub mod driver;

pub use buffer::{Buffer, CellUpdate};
pub use cell::{Cell, CellStyle};
pub use driver::Driver;
