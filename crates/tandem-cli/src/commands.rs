pub mod configure;
pub mod eval;
pub mod session;
pub mod version;
