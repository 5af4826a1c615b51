pub(crate) mod database;
pub(crate) mod fixtures;
pub(crate) mod jwt;
pub(crate) mod logging;
pub(crate) mod password;
pub(crate) mod settings;
