// Infrastructure adapters behind the application ports, plus the simulation
// scaffolding standing in for real upstream carriers

pub mod in_memory_store;
pub mod latency;
pub mod mock_carrier_feed;

pub use in_memory_store::InMemoryShipmentStore;
pub use latency::LatencyInjector;
pub use mock_carrier_feed::MockCarrierFeed;
