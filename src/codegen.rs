//! The code generator (ambient: §10.6). The general code generator that
//! pastes the serialized blob and a traversal routine into an arbitrary
//! host-language source file is, per §1, an external collaborator outside
//! this crate's core. This module is this crate's own Rust-only instance of
//! that role: it exists purely so the CLI has something concrete to emit,
//! and it works by delegating lookups back into `crate::runtime` rather than
//! re-deriving the traversal logic in generated source.

use std::fmt::Write as _;

/// Renders a Rust source file embedding `blob` as a `const` byte array and
/// a thin wrapper module exposing the three §6 callables.
pub fn generate_rust_module(namespace: &str, blob: &[u8]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "// Generated by quadgeo. Do not edit by hand.");
    let _ = writeln!(out, "// namespace = {namespace:?}");
    let _ = writeln!(out);
    let _ = writeln!(out, "pub mod {namespace} {{");
    let _ = writeln!(out, "    const BLOB: &[u8] = &{blob:?};");
    let _ = writeln!(out);
    let _ = writeln!(out, "    fn table() -> quadgeo::runtime::Table<'static> {{");
    let _ = writeln!(
        out,
        "        quadgeo::runtime::Table::decode(BLOB).expect(\"embedded blob must decode\")"
    );
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    /// `country_id(lat, lon) -> u16`.");
    let _ = writeln!(out, "    pub fn country_id(lat: f64, lon: f64) -> u16 {{");
    let _ = writeln!(out, "        table().lookup(lat, lon).unwrap_or(0)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    /// `country_iso(lat, lon) -> short string`.");
    let _ = writeln!(out, "    pub fn country_iso(lat: f64, lon: f64) -> String {{");
    let _ = writeln!(out, "        let t = table();");
    let _ = writeln!(out, "        let id = t.lookup(lat, lon).unwrap_or(0);");
    let _ = writeln!(
        out,
        "        t.country_table().code_for(id).as_str().to_string()"
    );
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    /// `country_id_from_iso(code) -> u16` (0 if unknown).");
    let _ = writeln!(out, "    pub fn country_id_from_iso(code: &str) -> u16 {{");
    let _ = writeln!(out, "        table().country_table().id_for_code(code)");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_module_mentions_namespace_and_embeds_blob_len() {
        let blob = vec![1u8, 2, 3];
        let source = generate_rust_module("world", &blob);
        assert!(source.contains("pub mod world"));
        assert!(source.contains("[1, 2, 3]"));
        assert!(source.contains("fn country_id"));
        assert!(source.contains("fn country_iso"));
        assert!(source.contains("fn country_id_from_iso"));
    }
}
