//! Command implementations.

pub mod extract;
pub mod files;
pub mod opportunities;
pub mod profile;
pub mod search;
pub mod text;
pub mod token;

pub use self::extract::execute_extract;
pub use self::files::execute_files;
pub use self::opportunities::execute_opportunities;
pub use self::profile::execute_profile;
pub use self::search::execute_search;
pub use self::text::execute_text;
pub use self::token::execute_token;
