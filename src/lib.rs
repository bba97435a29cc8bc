pub mod activation;
pub mod commands;
pub mod display;
pub mod doctor;
pub mod error;
pub mod fs_utils;
pub mod import;
pub mod logging;
pub mod paths;
pub mod profiles;
pub mod settings;
pub mod store;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
