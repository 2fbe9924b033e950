mod snowflake;
#[cfg(test)]
mod tests;

pub use snowflake::*;
