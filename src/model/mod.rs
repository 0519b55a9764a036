pub mod buffer;
pub mod config;
pub mod editor;
pub mod mark;
pub mod position;
pub mod thought;

pub use buffer::*;
pub use config::*;
pub use editor::*;
pub use mark::*;
pub use position::*;
pub use thought::*;
