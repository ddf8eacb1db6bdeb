//! Auth-domain token models, login flow, and session-backed token provider.

pub mod login;
pub mod observer;
pub mod provider;
pub mod token;

pub use login::*;
pub use observer::*;
pub use provider::*;
pub use token::*;
