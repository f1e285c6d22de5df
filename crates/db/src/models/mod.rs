pub mod analytics;
pub mod donor;
pub mod feedback;
pub mod food_item;
pub mod food_request;
pub mod ngo;
pub mod session;
pub mod transaction;
pub mod user;
