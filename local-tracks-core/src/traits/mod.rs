pub mod capture_provider;
pub mod track_handle;
pub mod track_observer;
