pub(crate) mod download;
pub(crate) mod events;
pub(crate) mod info;
pub(crate) mod meta;
pub(crate) mod ui;
