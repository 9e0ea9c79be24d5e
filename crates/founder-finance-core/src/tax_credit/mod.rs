pub mod qre;
