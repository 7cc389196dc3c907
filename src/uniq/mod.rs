pub mod config;
pub mod core;
pub mod key;
pub mod printer;


pub use self::config::*;
pub use self::core::*;
pub use self::key::*;
pub use self::printer::*;
