pub mod api_client;
pub mod cart_client;
