pub mod agent;
pub mod approval;
pub mod errors;
pub mod models;
pub mod panel;
pub mod prompt_template;
pub mod providers;
pub mod systems;
pub mod utility;
