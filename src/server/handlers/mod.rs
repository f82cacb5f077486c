pub mod health;
pub mod rides;
