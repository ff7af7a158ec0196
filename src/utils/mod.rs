pub mod bytes;

pub mod time;
