pub mod gridwatch;
