pub mod cart;
pub mod format;
pub mod types;
pub mod whatsapp;
