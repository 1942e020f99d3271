#![allow(dead_code)]

pub mod concat_merger;
pub mod segment_server;
