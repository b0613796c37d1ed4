//! ot-bench: Criterion micro-benchmarks for the sample store hot paths.
