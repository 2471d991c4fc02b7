//! Domain types for the refactor preview: raw edits, the file operations
//! they group into, checked state and conflicts.

pub mod checked;
pub mod conflicts;
pub mod edit;
pub mod error;
pub mod operation;
pub mod operations;
pub mod uri;

pub use checked::*;
pub use conflicts::*;
pub use edit::*;
pub use error::*;
pub use operation::*;
pub use operations::*;
pub use uri::*;
