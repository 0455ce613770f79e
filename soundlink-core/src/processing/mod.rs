pub mod byte_fifo;
pub mod pcm;
