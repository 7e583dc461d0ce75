//! Request-side domain types shared by the provider and the HTTP surface.

mod period;
mod symbol;

pub use period::Period;
pub use symbol::Symbol;
