pub mod builder;
pub mod canon;
pub mod hash;
pub mod key;

pub use builder::KeyBuilder;
pub use key::{
    generate_key, generate_key_from_query, generate_simple_key, KeyError, Pagination,
    QueryKeyParams,
};
