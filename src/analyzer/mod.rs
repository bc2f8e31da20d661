pub mod astgen;

pub use astgen::{
    write_json,
    AstGenerator,
    AstgenOutcome,
    AstgenRequest,
    Composition,
    FileComposition,
    FileDiagnostic,
};
