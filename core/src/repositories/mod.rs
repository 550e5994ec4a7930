pub mod flag;

pub use flag::{FlagStore, InMemoryFlagStore};
