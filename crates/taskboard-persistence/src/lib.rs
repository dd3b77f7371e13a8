pub mod conflict;
pub mod store;
pub mod traits;
pub mod unit_of_work;

pub use conflict::*;
pub use store::*;
pub use traits::*;
pub use unit_of_work::*;
