//! Prompt context: retrieved documents and recent chat history.
//!
//! | Part | Source | Bounded by |
//! |------|--------|------------|
//! | Documents | Retriever hits | 2000 chars per chunk, duplicates dropped |
//! | History | Prior turns | Last 20 messages |

pub mod assembler;
pub mod window;

pub use assembler::{ContextAssembler, assemble, display_name};
pub use window::{DEFAULT_HISTORY_LIMIT, window};
