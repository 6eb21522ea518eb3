//! Markdown directory task store.

mod store;

pub use store::MarkdownTaskStore;
