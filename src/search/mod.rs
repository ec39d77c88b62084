//! Lexical retrieval over the persisted chunk collection: additive ranking,
//! symbol lookup and keyword grep. Everything here is deterministic; ties
//! keep collection order.
pub mod lookup;
pub mod ranker;

pub use lookup::{find_by_symbol, grep};
pub use ranker::{Ranker, rank};
