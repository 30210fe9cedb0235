//! Generates Java sum types with exhaustive, narrowing match builders from a
//! JSON description of their variants.
pub mod cli;
pub mod codegen;
pub mod describe;
pub mod error;
pub mod ir;
pub mod naming;
pub mod path_de;
pub mod spec;

use std::sync::Once;

pub use codegen::{Codegen, GenOptions, generate, generate_with};
pub use error::{GenError, LoadError, SpecError};
pub use spec::{FieldSpec, GenericParam, MatchMode, SumTypeSpec, TypeRef, VariantSpec};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber filtered by `RUST_LOG`. Does nothing when
/// `RUST_LOG` is unset; safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
