pub mod session;

#[cfg(test)]
pub mod mock_provider;

pub use session::Session;
