pub mod controller;
pub mod mailbox;
