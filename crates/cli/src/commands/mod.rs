//! Command implementations.

mod info;
mod load;
mod validate;

pub use info::run_info;
pub use load::run_load;
pub use validate::run_validate;
