mod config;
mod types;

pub(crate) use config::{DB_TABLE_USER_INFO, GENERIC_DATA_STORE};
