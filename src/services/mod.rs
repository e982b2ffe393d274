pub mod id_generator;
pub mod observer;

pub use id_generator::{IdGenerator, IdStrategy};
pub use observer::{StoreEvent, StoreObserver, SubscriptionId};
