//! Generic storage layer: the resource description trait, the repository
//! every resource gets for free, and the transaction helper it runs writes in.

pub mod error;
pub mod repository;
pub mod traits;
pub mod transaction;

pub use repository::{Repository, paginate};
pub use traits::{CrudResource, MergeIntoActiveModel, provided};
pub use transaction::in_transaction;
