pub mod error;
pub mod id;
pub mod migrate;
pub mod model;
pub mod sticky;
pub mod store;
pub mod tree;

pub use error::{NotebookError, Result, StoreError};
pub use id::{IdKind, NodeId};
pub use migrate::migrate;
pub use model::*;
pub use sticky::StickyPatch;
pub use store::{
    DEFAULT_STORAGE_KEY, FileStore, KeyValueStore, MemoryStore, decode_state, load_state,
    save_state,
};
