pub mod answer;
pub mod attribute;
pub mod candidate;
pub mod question;
pub mod roster;
