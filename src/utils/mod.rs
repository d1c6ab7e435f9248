pub mod dates;
pub mod pin;
