pub mod align;
pub mod config;
pub mod delays;
pub mod error;
pub mod extract;
pub mod features;
pub mod fetch;
pub mod holidays;
pub mod mapping;
pub mod model;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod static_data;

pub mod gtfs_rt {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}
