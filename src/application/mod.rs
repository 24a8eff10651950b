pub mod downloads_service;
pub mod identity;
pub mod picklist_service;
pub mod row_extractor;
pub mod submission;
