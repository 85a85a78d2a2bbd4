pub mod certification;
pub mod profile;
