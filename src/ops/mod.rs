pub mod check;
pub mod gate;
pub mod history;
pub mod layout;
pub mod regions;
pub mod stream;
pub mod submit;
