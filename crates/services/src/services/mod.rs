pub mod daily_plans;
pub mod database_validator;
pub mod families;
pub mod goals;
pub mod mention_sync;
pub mod mentionable;
pub mod patch;
pub mod user_directory;
pub mod weekly_reviews;

#[cfg(test)]
pub(crate) mod test_support;
