
mod engine;
mod macros;
mod proxy;


fn main() {}
