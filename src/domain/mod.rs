pub mod downloads;
pub mod errors;
pub mod picklist;
pub mod ports;
pub mod quantity;
pub mod ui_state;
