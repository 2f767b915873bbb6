//! Frontend module - AST, Symbol Tables, Semantic Analysis

pub mod ast;
pub mod semantic;
pub mod symbols;
