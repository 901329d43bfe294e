//! Value objects - Immutable objects defined by their attributes

mod context;
mod if_statement;
pub mod params;
mod value;

pub use context::Context;
pub use if_statement::IfStatement;
pub use params::{
    check_params, prepare_param, prepare_params, validate_param, ParamSpec, ParamType,
    ParamsSchema,
};
pub use value::{
    as_integer, as_number, is_truthy, lookup_ref, lookup_str, number_to_string, number_value, parse_number,
    strict_equals, strip_quotes,
};
