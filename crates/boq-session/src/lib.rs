//! # BOQ Session
//!
//! 會話與持久化邊界：估算會話（顯式上下文物件）、髒標記追蹤、
//! 防抖自動儲存、版本生命週期與抽象存儲介面

pub mod autosave;
pub mod dirty;
pub mod lifecycle;
pub mod memory;
pub mod session;
pub mod store;

// Re-export 主要類型
pub use autosave::{Autosaver, SaveRequest, DEFAULT_QUIET_PERIOD};
pub use dirty::DirtyTracker;
pub use lifecycle::VersionManager;
pub use memory::InMemoryStore;
pub use session::EstimateSession;
pub use store::{CatalogQuery, CatalogService, VersionItemStore};
