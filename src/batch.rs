//! Many independent encode/decode calls against one registry.
//!
//! With the `parallel` feature the calls run on Rayon's global pool;
//! otherwise they run in order on the calling thread.  Either way the output
//! keeps input order, and if any call fails the error of the first failing
//! input (in input order) is returned.

use serde_json::Value;
use tracing::debug;

use crate::codec::Encoded;
use crate::registry::{Registry, Result};

/// Decode every input as `format`.
pub fn decode_all<I>(registry: &Registry, format: &str, inputs: &[I]) -> Result<Vec<Value>>
where
    I: AsRef<[u8]> + Sync,
{
    debug!(format, count = inputs.len(), "batch decode");

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<Result<Value>> = inputs
            .par_iter()
            .map(|input| registry.decode(format, input, None))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        inputs
            .iter()
            .map(|input| registry.decode(format, input, None))
            .collect()
    }
}

/// Encode every value as `format`.
pub fn encode_all(registry: &Registry, values: &[Value], format: &str) -> Result<Vec<Encoded>> {
    debug!(format, count = values.len(), "batch encode");

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        let results: Vec<Result<Encoded>> = values
            .par_iter()
            .map(|value| registry.encode(value, format))
            .collect();
        results.into_iter().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        values.iter().map(|value| registry.encode(value, format)).collect()
    }
}
