//! Create/read/update/delete over the four food-donation tables.
//!
//! [`CrudOrchestrator`] validates submitted [`Record`]s against the static
//! [`TableKind`] field lists, generates positional-parameter SQL and hands it
//! to a [`db::DataAccess`] handle.

pub mod error;
pub mod orchestrator;
pub mod record;
pub mod schema;

pub use error::CrudError;
pub use orchestrator::{CrudOrchestrator, EditForm, FormField};
pub use record::Record;
pub use schema::{FieldKind, FieldSpec, TableKind};
