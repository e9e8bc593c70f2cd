//! Language-specific scanner configurations.
//!
//! Each module exposes `new_scanner` and `register`. The scanners share the
//! pattern engine and differ only in their tables.

pub mod c;
pub mod cpp;
pub mod csharp;
pub mod go;
pub mod java;
pub mod javascript;
pub mod julia;
pub mod php;
pub mod python;
pub mod r;
pub mod rust_lang;
pub mod swift;
pub mod typescript;

use super::Registry;

/// Register every built-in language scanner.
pub fn register_all(registry: &mut Registry) {
    c::register(registry);
    cpp::register(registry);
    csharp::register(registry);
    go::register(registry);
    java::register(registry);
    javascript::register(registry);
    julia::register(registry);
    php::register(registry);
    python::register(registry);
    r::register(registry);
    rust_lang::register(registry);
    swift::register(registry);
    typescript::register(registry);
}
