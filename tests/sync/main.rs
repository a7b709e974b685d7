//! Record lifecycle → search index / tenant token integration tests.

mod bootstrap;
mod support;
mod trails;
mod users;
