pub mod decision;
pub mod model;
pub mod preprocess;
