pub mod ctx;
pub mod error;
pub mod mw_ctx;
pub mod utils;
