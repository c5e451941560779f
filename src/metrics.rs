#[cfg(feature = "metrics")]
mod prom {
    use lazy_static::lazy_static;
    use prometheus::{register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder};

    lazy_static! {
        static ref ELEMENTS_DECODED: IntCounter = register_int_counter!(
            "jsonslice_elements_decoded_total",
            "Total number of array elements decoded"
        )
        .expect("metric name is unique");
        static ref VALUES_SKIPPED: IntCounter = register_int_counter!(
            "jsonslice_values_skipped_total",
            "Total number of sibling containers skipped while tracking a path"
        )
        .expect("metric name is unique");
        static ref BUFFER_SIZE_GAUGE: IntGauge = register_int_gauge!(
            "jsonslice_buffer_size_bytes",
            "Current size of the decoder buffer in bytes"
        )
        .expect("metric name is unique");
    }

    pub(crate) fn record_element() {
        ELEMENTS_DECODED.inc();
    }

    pub(crate) fn record_skipped_value() {
        VALUES_SKIPPED.inc();
    }

    pub(crate) fn record_buffer_size(len: usize) {
        BUFFER_SIZE_GAUGE.set(len as i64);
    }

    /// Renders every registered metric in the Prometheus text format.
    pub fn gather_metrics() -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(feature = "metrics")]
pub use prom::gather_metrics;
#[cfg(feature = "metrics")]
pub(crate) use prom::{record_buffer_size, record_element, record_skipped_value};

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_element() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_skipped_value() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_buffer_size(_len: usize) {}
