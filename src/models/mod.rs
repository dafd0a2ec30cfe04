//! Update event model types.

mod call;
mod dependency;
mod event;
mod scenario;

pub use call::*;
pub use dependency::*;
pub use event::*;
pub use scenario::*;
