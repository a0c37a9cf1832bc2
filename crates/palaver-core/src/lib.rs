pub mod avatar;
pub mod config;
pub mod correspondent;
pub mod error;
pub mod format;
pub mod history;
pub mod message;
pub mod profile;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod simulation;
pub mod store;
pub mod surface;

// Re-export main types for convenience
pub use avatar::{AvatarStore, ImageCompressor, JpegCompressor, Upload};
pub use config::{Config, SessionSettings};
pub use correspondent::{parse_query, Correspondent};
pub use error::{AvatarError, HistoryError, StoreError};
pub use format::{Clock, Fragment, TimeFormat};
pub use history::HistoryStore;
pub use message::{Direction, HistoryLog, Message};
pub use profile::{ChatSummary, GroupSummary, Profile, ProfileAction, ProfileTab};
pub use render::{Avatar, Block, MessageBlock};
pub use scheduler::SessionEvent;
pub use session::{CallKind, ChatSession, Presence};
pub use simulation::{FixedSource, RandomSource, SimulationSource};
pub use store::{KvStore, MemoryKvStore, SqliteKvStore};
pub use surface::{DisplaySurface, Region, ScreenModel};
