pub mod aggregate;
pub mod attribution;
pub mod checkin;
pub mod enums;
pub mod registry;
pub mod sliders;

pub use aggregate::*;
pub use attribution::*;
pub use checkin::*;
pub use registry::*;
pub use sliders::*;
