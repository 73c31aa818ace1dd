pub mod container;
pub mod deserialize;
pub mod error;
pub mod function;
pub mod identifier;
pub mod lookup;
pub mod typ;
pub mod typeclass;
pub mod typed;
pub mod value;
