mod integration;
mod utils;
