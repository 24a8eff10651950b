pub mod cart;
pub mod downloads;
pub mod modifiers;
