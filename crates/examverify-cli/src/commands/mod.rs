pub mod init;
pub mod inspect;
pub mod rules;
pub mod verify;
