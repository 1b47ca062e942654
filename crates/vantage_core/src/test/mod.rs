mod cover;

pub mod util;
