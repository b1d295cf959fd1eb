pub(crate) mod complete;
pub(crate) mod health_check;

pub use complete::*;
pub use health_check::*;
