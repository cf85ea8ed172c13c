pub mod assets;
pub mod logging;
pub mod near;
pub mod oneclick;
pub mod payment;
pub mod schedule;

pub mod proto {
    pub mod v1 {
        tonic::include_proto!("recurring_intents.v1");
    }
}
