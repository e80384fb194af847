pub mod command_handlers;
pub mod dispatcher;
pub mod explore;
pub mod main_types;
