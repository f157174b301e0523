pub mod collation;
pub mod cube;
pub mod lookup;
pub mod member;
