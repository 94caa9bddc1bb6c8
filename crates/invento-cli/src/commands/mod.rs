//! `invento` subcommands.

pub mod add_user;
pub mod check;
pub mod init_db;
pub mod serve;
