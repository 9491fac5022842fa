pub mod pagination;
pub mod serde_helpers;
pub mod validation;
pub mod view_scope;

pub use pagination::Paginator;
pub use view_scope::ViewScope;
