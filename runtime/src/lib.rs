mod error;
pub use error::{AdvanceError, RuntimeError};

mod notification;
pub use notification::{Notification, PlayerListener};

mod session;
pub use session::{Phase, PlayerSession};

mod store;
pub use store::{DialogStore, Effect, MemoryStore, SessionId};

mod player;
pub use player::{Player, BLANK};

pub use charla_common::*;
