pub mod compiler;
pub mod controller;
pub mod generator;
pub mod index;
