pub mod query_rewriter;
