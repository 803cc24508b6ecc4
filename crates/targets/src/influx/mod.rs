//! InfluxDB line-protocol target

mod batch;
mod benchmark;
mod gzip;
mod http;
mod processor;

pub use batch::{LineBatch, LineBatchFactory};
pub use benchmark::{series_key, InfluxBenchmark};
pub use gzip::compress_into;
pub use http::{authorization, write_url, HttpTransport, HttpTransportFactory, TransportFactory};
pub use processor::InfluxProcessor;
