pub mod stackoverflow;
