//! Registry traits for named converters.
//!
//! Both the symbol tables and the renderer table implement [`Registry`], so
//! callers can list and look up converters by their ESRI kind key.

mod traits;

pub use traits::Registry;
