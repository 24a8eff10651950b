pub mod download_link;
pub mod escape;
pub mod markup;
pub mod view;
