//! HTTP surface: the classification endpoint and the Prometheus
//! exporter. Only compiled with the `service` feature.

mod server;

pub use server::{
    ClassifyRequest, ClassifyResponse, ScanService, ServerConfig, ServerError, ServiceState,
};
