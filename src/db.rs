pub mod receiving_repo;
pub use receiving_repo::ReceivingRepository;
pub mod sales_repo;
pub use sales_repo::SalesRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
