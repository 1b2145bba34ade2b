//! Loading and validation of card data, decks and saved layouts.

pub mod abilities;
pub mod layout_file;
pub mod load;
pub mod schema;

pub use abilities::*;
pub use layout_file::*;
pub use load::*;
pub use schema::*;
