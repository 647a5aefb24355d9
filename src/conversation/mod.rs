//! Per-chat dialogs for onboarding, manual trades and copy-trade setup.

pub mod context;
pub mod handler;
pub mod input;
pub mod menus;
pub mod state;

pub use context::{Button, ChatContext, Keyboard};
pub use handler::{ConversationService, DialogSettings};
pub use input::{MenuAction, UserInput};
pub use state::{ConversationState, ConversationStates};
