mod common;
mod renderer;
mod service;
