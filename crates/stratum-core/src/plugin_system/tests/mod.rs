pub mod common;
pub mod traits_tests;
