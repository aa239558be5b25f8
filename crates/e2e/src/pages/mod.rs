//! Page objects for the OrangeHRM screens under test

pub mod base;
pub mod login;
pub mod search;

pub use base::BasePage;
pub use login::LoginPage;
pub use search::SearchPage;
