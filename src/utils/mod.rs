pub mod env;
pub mod ssh;
pub mod user_data;

pub use env::default_to_env;
pub use ssh::{verify_ssh_key_file, AuthorizedKey};
pub use user_data::write_user_data;
