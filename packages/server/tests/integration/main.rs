mod common;
mod journal;
