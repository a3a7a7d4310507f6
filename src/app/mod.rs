pub mod ports;
pub mod track_use_case;

pub use track_use_case::TrackShipmentUseCase;
