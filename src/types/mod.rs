pub mod error;

pub use error::{
    CompletionError, ErrorCategory, ErrorClassifier, FuncsumError, LlmError, Result,
};

use std::collections::HashMap;

/// Function name → decompiled C-like source text
pub type FunctionSources = HashMap<String, String>;
