pub mod context;
pub mod events;
pub mod handle_table;
pub mod machine;
pub mod publisher;
pub mod track_session;
