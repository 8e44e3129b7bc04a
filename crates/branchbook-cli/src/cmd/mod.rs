pub mod chapter;
pub mod choice;
pub mod diagnose;
pub mod init;
pub mod meta;
pub mod publish;
pub mod read;
pub mod route;
pub mod validate;
