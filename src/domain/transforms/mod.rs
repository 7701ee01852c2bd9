//! Tree transforms applied around backend reads and writes.

pub mod complex_codec;
pub mod flatten;
pub mod normalize;
pub mod prune;

pub use complex_codec::{
    complex_record, decode_complex, encode_complex, is_complex_record, COMPLEX_TAG, PAYLOAD_KEY,
    TYPE_KEY,
};
pub use flatten::flatten_arrays;
pub use normalize::{normalize_arrays, NormalizeOptions};
pub use prune::prune_nulls;
