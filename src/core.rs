pub mod activity;
pub mod draft;
pub mod error;
pub mod schema;
pub mod traits;

pub use self::activity::*;
pub use self::draft::*;
pub use self::error::*;
pub use self::schema::*;
pub use self::traits::*;
