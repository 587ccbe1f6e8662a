pub mod api;
pub mod attachments;
pub mod error;
pub mod folders;
pub mod keyring;
pub mod mime;
pub mod models;
pub mod paging;
pub mod preview;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
