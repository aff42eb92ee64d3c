/// UI module exports
pub mod analysis;
pub mod chat;
pub mod components;
pub mod filters;
pub mod hooks;
pub mod popup;
