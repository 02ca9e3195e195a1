pub mod mastery;
pub mod selection;
