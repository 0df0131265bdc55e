pub mod boxed;
pub mod into_iter;
pub mod vec;
