pub mod daily_plan;
pub mod family;
pub mod goal;
pub mod mention;
pub mod user;
pub mod weekly_review;
