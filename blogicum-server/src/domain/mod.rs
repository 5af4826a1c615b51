pub(crate) mod catalog;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod guard;
pub(crate) mod listing;
pub(crate) mod post;
pub(crate) mod user;
pub(crate) mod viewer;
pub(crate) mod visibility;
