pub mod dto;
pub mod password;
mod repo;
pub mod repo_types;
pub mod services;

pub(crate) use repo::{count as count_users, find_by_id as find_user_row, update as update_user_row};
