pub mod into_zoned_trait;
pub mod measurement_type;
pub mod point;
pub mod station;
