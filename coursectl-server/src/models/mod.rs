//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod assignment;
pub mod content;
pub mod course;
pub mod deadline;
pub mod email;
pub mod pagination;
pub mod role;
pub mod validation;

pub use assignment::AssignmentKind;
pub use content::Content;
pub use course::CourseId;
pub use deadline::{DropDeadline, DEADLINE_FORMAT};
pub use email::EmailAddress;
pub use pagination::{Page, PageParams, Paginated};
pub use role::{CourseRole, UserRole};
pub use validation::ValidationError;
