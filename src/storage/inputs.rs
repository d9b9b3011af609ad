use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

use crate::graph::CallGraph;
use crate::types::{FuncsumError, FunctionSources, Result};

/// Load the call graph JSON (`{"name": ["callee", ...]}`)
pub fn load_call_graph(path: &Path) -> Result<CallGraph> {
    let graph: CallGraph = read_json(path)?;
    tracing::debug!(
        "Loaded call graph from {}: {} functions, {} edges",
        path.display(),
        graph.len(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Load the decompilations JSON (`{"name": "source text"}`)
pub fn load_sources(path: &Path) -> Result<FunctionSources> {
    let sources: FunctionSources = read_json(path)?;
    tracing::debug!(
        "Loaded {} decompiled functions from {}",
        sources.len(),
        path.display()
    );
    Ok(sources)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| FuncsumError::input(path, format!("cannot read file: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| FuncsumError::input(path, format!("invalid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_call_graph() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("call_graph.json");
        fs::write(&path, r#"{"main": ["helper", "puts"], "helper": []}"#).unwrap();

        let graph = load_call_graph(&path).unwrap();
        assert_eq!(graph.callees("main"), ["helper", "puts"]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_load_sources() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("decompilations.json");
        fs::write(&path, r#"{"main": "int main() { return 0; }"}"#).unwrap();

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources["main"], "int main() { return 0; }");
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let dir = TempDir::new().unwrap();
        let err = load_call_graph(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FuncsumError::Input { .. }));
    }

    #[test]
    fn test_wrong_shape_is_input_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("call_graph.json");
        fs::write(&path, r#"{"main": "not a list"}"#).unwrap();

        let err = load_call_graph(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
