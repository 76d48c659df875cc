pub mod fitting;
pub mod similarity;
