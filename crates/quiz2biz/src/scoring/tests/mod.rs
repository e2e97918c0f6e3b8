mod common;
mod engine;
mod residual;
