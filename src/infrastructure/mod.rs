pub mod account_client;
pub mod catalog_client;
pub mod grouping;
pub mod models;
pub mod order_repo;

pub use account_client::HttpAccountDirectory;
pub use catalog_client::HttpProductCatalog;
pub use order_repo::DieselOrderRepository;
