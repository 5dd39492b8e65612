//! Rule compilation pipeline for the detection engines.

pub mod compiler;
