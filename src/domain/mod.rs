pub mod dispatch;
pub mod forecast;

pub use dispatch::*;
pub use forecast::*;
