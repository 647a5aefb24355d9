pub mod copy_executor;
pub mod position_sizer;
pub mod swap_executor;

pub use copy_executor::{CopyOutcome, CopyTradeExecutor};
pub use swap_executor::SwapExecutor;
