pub mod listener;
pub mod registry;
pub mod swap_extractor;

pub use listener::TransactionListener;
pub use registry::SubscriptionRegistry;
pub use swap_extractor::extract_swap;
