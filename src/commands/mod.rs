pub mod evaluate;
pub mod pairs;
