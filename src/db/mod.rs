pub mod content;
pub mod plans;
pub mod products;
pub mod users;
