pub mod builder;
pub mod cursor;
pub mod green;
pub mod kind;
pub mod node;
pub mod printer;
pub mod text;
pub mod tree;

pub use builder::*;
pub use cursor::*;
pub use green::*;
pub use kind::*;
pub use node::*;
pub use printer::*;
pub use text::*;
pub use tree::*;
