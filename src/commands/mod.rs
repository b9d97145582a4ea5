pub mod extract;
pub mod headers;
pub mod inspect;
pub mod sync;
